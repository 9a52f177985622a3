pub mod adapter_registry;
pub mod conflict_resolution;
pub mod entity_adapter;
pub mod entity_repository;
pub mod record_locks;
pub mod sync_engine;
pub mod sync_scheduler;
pub mod tenant_guard;

pub use adapter_registry::AdapterRegistry;
pub use conflict_resolution::{DeferReason, Reconciliation, reconcile};
pub use entity_adapter::{EntityAdapter, TranslatedRecord, TypedAdapter};
pub use entity_repository::{EntityFilter, EntityRepository};
pub use record_locks::RecordLocks;
pub use sync_engine::SyncEngine;
pub use sync_scheduler::{
    KeySyncStatus, SchedulerSettings, SyncMode, SyncScheduler, TriggerOutcome,
};
pub use tenant_guard::TenantGuard;
