use crate::domain::entities::EntityRecord;
use crate::domain::value_objects::ConflictPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// The local tombstone has not reached the remote yet.
    PendingDelete,
    /// `PreserveDirtyLocal` keeps unsynced local edits.
    DirtyLocal,
}

/// What a pull should do with one incoming remote row.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    Insert(EntityRecord),
    Update(EntityRecord),
    Unchanged,
    Deferred(DeferReason),
}

/// Decides how `remote` lands on top of the local row with the same id.
///
/// Remote content always replaces clean rows. A dirty row under `RemoteWins` takes the
/// remote content but stays dirty, so the next push re-sends the now identical state.
pub fn reconcile(
    policy: ConflictPolicy,
    local: Option<&EntityRecord>,
    remote: EntityRecord,
) -> Reconciliation {
    let Some(local) = local else {
        return Reconciliation::Insert(remote);
    };

    if local.is_pending_delete() {
        return Reconciliation::Deferred(DeferReason::PendingDelete);
    }

    if local.needs_sync {
        return match policy {
            ConflictPolicy::PreserveDirtyLocal => {
                Reconciliation::Deferred(DeferReason::DirtyLocal)
            }
            ConflictPolicy::RemoteWins if local.same_content(&remote) => {
                Reconciliation::Unchanged
            }
            ConflictPolicy::RemoteWins => Reconciliation::Update(EntityRecord {
                needs_sync: true,
                local_version: local.local_version,
                ..remote
            }),
        };
    }

    if local.same_content(&remote) {
        Reconciliation::Unchanged
    } else {
        Reconciliation::Update(EntityRecord {
            local_version: local.local_version,
            ..remote
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{EntityId, EntityPayload, EntityType, TenantId};
    use chrono::DateTime;

    fn remote(name: &str, updated_ms: i64) -> EntityRecord {
        EntityRecord::from_remote(
            EntityType::parse("customer").unwrap(),
            EntityId::parse("c1").unwrap(),
            TenantId::parse("biz-1").unwrap(),
            EntityPayload::from_json_str(&format!(r#"{{"name":"{name}"}}"#)).unwrap(),
            DateTime::from_timestamp_millis(1_000).unwrap(),
            DateTime::from_timestamp_millis(updated_ms).unwrap(),
        )
    }

    #[test]
    fn absent_row_is_inserted_clean() {
        let decision = reconcile(ConflictPolicy::RemoteWins, None, remote("Ayşe", 2_000));
        let Reconciliation::Insert(record) = decision else {
            panic!("expected insert, got {decision:?}");
        };
        assert!(!record.needs_sync);
    }

    #[test]
    fn identical_clean_row_is_unchanged() {
        let local = remote("Ayşe", 2_000);
        assert_eq!(
            reconcile(ConflictPolicy::RemoteWins, Some(&local), remote("Ayşe", 2_000)),
            Reconciliation::Unchanged
        );
    }

    #[test]
    fn pending_delete_is_never_resurrected() {
        let mut local = remote("Ayşe", 2_000);
        local.mark_deleted();
        for policy in [ConflictPolicy::RemoteWins, ConflictPolicy::PreserveDirtyLocal] {
            assert_eq!(
                reconcile(policy, Some(&local), remote("Ayşe", 9_000)),
                Reconciliation::Deferred(DeferReason::PendingDelete)
            );
        }
    }

    #[test]
    fn dirty_row_follows_policy() {
        let mut local = remote("Ayşe", 2_000);
        local.touch(EntityPayload::from_json_str(r#"{"name":"Ayse Y."}"#).unwrap());

        assert_eq!(
            reconcile(ConflictPolicy::PreserveDirtyLocal, Some(&local), remote("Ayşe K.", 3_000)),
            Reconciliation::Deferred(DeferReason::DirtyLocal)
        );

        let Reconciliation::Update(record) =
            reconcile(ConflictPolicy::RemoteWins, Some(&local), remote("Ayşe K.", 3_000))
        else {
            panic!("remote wins should update");
        };
        assert!(record.needs_sync);
        assert_eq!(record.payload.get("name").and_then(|v| v.as_str()), Some("Ayşe K."));
    }
}
