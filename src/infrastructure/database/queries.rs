pub(super) const RECORD_COLUMNS: &str = "entity_type, id, tenant_id, payload, created_at, \
     updated_at, is_deleted, needs_sync, local_version";

pub(super) const SELECT_RECORD_BY_ID: &str = r#"
    SELECT entity_type, id, tenant_id, payload, created_at, updated_at,
           is_deleted, needs_sync, local_version
    FROM entity_records
    WHERE entity_type = ?1 AND id = ?2
"#;

/// The conflict branch only fires for the owning tenant; a foreign row returns nothing.
pub(super) const UPSERT_RECORD: &str = r#"
    INSERT INTO entity_records (
        entity_type, id, tenant_id, payload, created_at, updated_at,
        is_deleted, needs_sync, local_version
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)
    ON CONFLICT(entity_type, id) DO UPDATE SET
        payload = excluded.payload,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at,
        is_deleted = excluded.is_deleted,
        needs_sync = excluded.needs_sync,
        local_version = entity_records.local_version + 1
    WHERE entity_records.tenant_id = excluded.tenant_id
    RETURNING entity_type, id, tenant_id, payload, created_at, updated_at,
              is_deleted, needs_sync, local_version
"#;

pub(super) const UPDATE_RECORD: &str = r#"
    UPDATE entity_records
    SET payload = ?4,
        updated_at = ?5,
        is_deleted = ?6,
        needs_sync = ?7,
        local_version = local_version + 1
    WHERE entity_type = ?1 AND id = ?2 AND tenant_id = ?3
    RETURNING entity_type, id, tenant_id, payload, created_at, updated_at,
              is_deleted, needs_sync, local_version
"#;

pub(super) const SOFT_DELETE_RECORD: &str = r#"
    UPDATE entity_records
    SET is_deleted = 1,
        needs_sync = 1,
        updated_at = MAX(updated_at, ?4),
        local_version = local_version + 1
    WHERE entity_type = ?1 AND id = ?2 AND tenant_id = ?3 AND is_deleted = 0
"#;

pub(super) const HARD_DELETE_RECORD: &str = r#"
    DELETE FROM entity_records
    WHERE entity_type = ?1 AND id = ?2 AND tenant_id = ?3
"#;

pub(super) const COUNT_RECORDS: &str = r#"
    SELECT COUNT(*)
    FROM entity_records
    WHERE tenant_id = ?1 AND entity_type = ?2 AND (?3 OR is_deleted = 0)
"#;

pub(super) const SELECT_NEEDING_SYNC: &str = r#"
    SELECT entity_type, id, tenant_id, payload, created_at, updated_at,
           is_deleted, needs_sync, local_version
    FROM entity_records
    WHERE tenant_id = ?1 AND entity_type = ?2 AND needs_sync = 1
    ORDER BY updated_at ASC, id ASC
"#;

pub(super) const MARK_SYNCED: &str = r#"
    UPDATE entity_records
    SET needs_sync = 0
    WHERE tenant_id = ?1
      AND entity_type = ?2
      AND id = ?3
      AND local_version = ?4
      AND needs_sync = 1
"#;
