use super::{EntityType, TenantId};
use std::fmt;

/// Unit of sync mutual exclusion: one tenant, one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub tenant_id: TenantId,
    pub entity_type: EntityType,
}

impl SyncKey {
    pub fn new(tenant_id: TenantId, entity_type: EntityType) -> Self {
        Self {
            tenant_id,
            entity_type,
        }
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.entity_type)
    }
}
