use crate::domain::entities::{EntityRecord, LocalChange};
use crate::domain::value_objects::{EntityId, EntityType, TenantId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Optional filters on top of the mandatory tenant scope. Field names come from the
/// entity descriptor (`status_field`, `date_field`, `search_fields`).
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub include_deleted: bool,
    pub status: Option<FieldMatch>,
    pub date_range: Option<DateRange>,
    pub text: Option<TextSearch>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub field: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub fields: Vec<String>,
    pub needle: String,
}

#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn query(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        query: &RecordQuery,
    ) -> Result<Vec<EntityRecord>, AppError>;

    /// Fails with `TenantMismatch` when the id exists under another tenant.
    async fn get(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> Result<Option<EntityRecord>, AppError>;

    /// Insert-or-replace; returns the stored row with its new `local_version`.
    async fn upsert(&self, record: EntityRecord) -> Result<EntityRecord, AppError>;

    async fn upsert_many(&self, records: Vec<EntityRecord>) -> Result<u32, AppError>;

    /// Replaces an existing row; `NotFound` when it is absent.
    async fn update(&self, record: EntityRecord) -> Result<EntityRecord, AppError>;

    async fn soft_delete(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> Result<bool, AppError>;

    async fn hard_delete(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> Result<bool, AppError>;

    async fn count(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        include_deleted: bool,
    ) -> Result<u64, AppError>;

    /// Every dirty row for the tenant, tombstones included.
    async fn list_needing_sync(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
    ) -> Result<Vec<EntityRecord>, AppError>;

    /// Clears the dirty flag only if the row is still at `local_version`.
    async fn mark_synced(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
        local_version: i64,
    ) -> Result<bool, AppError>;

    fn subscribe(&self) -> broadcast::Receiver<LocalChange>;
}
