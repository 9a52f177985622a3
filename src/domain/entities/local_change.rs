use crate::domain::value_objects::{EntityId, EntityType, TenantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalChangeKind {
    Upserted,
    SoftDeleted,
    Purged,
    Synced,
}

/// Broadcast by the local store after every committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChange {
    pub tenant_id: TenantId,
    pub entity_type: EntityType,
    pub id: EntityId,
    pub kind: LocalChangeKind,
}
