use crate::domain::value_objects::{EntityId, EntityType, TenantId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

const PRUNE_THRESHOLD: usize = 256;

type RecordKey = (TenantId, EntityType, EntityId);

/// Serializes local writes per record so a pull cannot interleave with a user edit.
/// Keys are tenant-scoped like the rows they guard.
#[derive(Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<RecordKey, Weak<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if locks.len() >= PRUNE_THRESHOLD {
                locks.retain(|_, weak| weak.strong_count() > 0);
            }
            let key = (tenant.clone(), entity_type.clone(), id.clone());
            match locks.get(&key).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    let created = Arc::new(AsyncMutex::new(()));
                    locks.insert(key, Arc::downgrade(&created));
                    created
                }
            }
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .map(|locks| locks.values().filter(|weak| weak.strong_count() > 0).count())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(tenant: &str, id: &str) -> RecordKey {
        (
            TenantId::parse(tenant).unwrap(),
            EntityType::parse("customer").unwrap(),
            EntityId::parse(id).unwrap(),
        )
    }

    #[tokio::test]
    async fn same_record_is_exclusive() {
        let locks = Arc::new(RecordLocks::new());
        let (tenant, entity_type, id) = key("biz-1", "c1");
        let guard = locks.lock(&tenant, &entity_type, &id).await;

        let contender = {
            let locks = Arc::clone(&locks);
            let (tenant, entity_type, id) = (tenant.clone(), entity_type.clone(), id.clone());
            tokio::spawn(async move {
                let _guard = locks.lock(&tenant, &entity_type, &id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_records_do_not_block() {
        let locks = RecordLocks::new();
        let (tenant, entity_type, first) = key("biz-1", "c1");
        let (_, _, second) = key("biz-1", "c2");
        let _a = locks.lock(&tenant, &entity_type, &first).await;
        let _b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(&tenant, &entity_type, &second),
        )
        .await
        .expect("independent record should lock immediately");
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn same_id_in_another_tenant_does_not_block() {
        let locks = RecordLocks::new();
        let (owner, entity_type, id) = key("biz-1", "c1");
        let (other, _, _) = key("biz-2", "c1");
        let _held = locks.lock(&owner, &entity_type, &id).await;
        let _other = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(&other, &entity_type, &id),
        )
        .await
        .expect("colliding id of another tenant should lock immediately");
        assert_eq!(locks.tracked(), 2);
    }
}
