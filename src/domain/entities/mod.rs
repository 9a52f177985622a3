pub mod business;
pub mod local_change;
pub mod remote_document;
pub mod sync_entity;
pub mod sync_record;
pub mod sync_summary;
pub mod translation;

pub use local_change::{LocalChange, LocalChangeKind};
pub use remote_document::{
    FIELD_CREATED_AT, FIELD_TENANT_ID, FIELD_UPDATED_AT, RemoteDocument, TenantFilter,
};
pub use sync_entity::{Entity, EntityDescriptor, EnumField, SyncEntity};
pub use sync_record::{EntityRecord, timestamp_now};
pub use sync_summary::{PullSummary, PushSummary, SyncReport};
pub use translation::{FieldFallback, Translation};
