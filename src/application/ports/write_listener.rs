use crate::domain::value_objects::{EntityType, TenantId};

/// Told about every committed local write; must return immediately.
pub trait LocalWriteListener: Send + Sync {
    fn on_local_write(&self, tenant: &TenantId, entity_type: &EntityType);
}
