pub mod entities;
pub mod value_objects;

pub use entities::{Entity, EntityRecord, RemoteDocument, SyncEntity};
pub use value_objects::{EntityId, EntityPayload, EntityType, SyncKey, TenantId};
