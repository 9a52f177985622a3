use crate::domain::value_objects::{EntityId, EntityPayload, EntityType, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current time truncated to the millisecond precision both stores persist.
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Untyped local row shared by every entity type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRecord {
    pub entity_type: EntityType,
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub payload: EntityPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub needs_sync: bool,
    /// Bumped by the local store on every write; zero until first persisted.
    pub local_version: i64,
}

impl EntityRecord {
    /// A record born on this device: dirty until the remote acknowledges it.
    pub fn new_local(
        entity_type: EntityType,
        id: EntityId,
        tenant_id: TenantId,
        payload: EntityPayload,
    ) -> Self {
        let now = timestamp_now();
        Self {
            entity_type,
            id,
            tenant_id,
            payload,
            created_at: now,
            updated_at: now,
            is_deleted: false,
            needs_sync: true,
            local_version: 0,
        }
    }

    /// A record that arrived from the remote store and needs no upload.
    pub fn from_remote(
        entity_type: EntityType,
        id: EntityId,
        tenant_id: TenantId,
        payload: EntityPayload,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_type,
            id,
            tenant_id,
            payload,
            created_at,
            updated_at,
            is_deleted: false,
            needs_sync: false,
            local_version: 0,
        }
    }

    pub fn touch(&mut self, payload: EntityPayload) {
        self.payload = payload;
        self.updated_at = timestamp_now().max(self.updated_at);
        self.needs_sync = true;
    }

    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
        self.needs_sync = true;
        self.updated_at = timestamp_now().max(self.updated_at);
    }

    pub fn is_pending_delete(&self) -> bool {
        self.is_deleted && self.needs_sync
    }

    /// True when the remote-relevant state of both rows is identical.
    pub fn same_content(&self, other: &EntityRecord) -> bool {
        self.tenant_id == other.tenant_id
            && self.payload == other.payload
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && self.is_deleted == other.is_deleted
    }
}
