pub mod conflict_policy;
pub mod entity_id;
pub mod entity_type;
pub mod payload;
pub mod sync_key;
pub mod tenant_id;

pub use conflict_policy::ConflictPolicy;
pub use entity_id::EntityId;
pub use entity_type::EntityType;
pub use payload::EntityPayload;
pub use sync_key::SyncKey;
pub use tenant_id::TenantId;
