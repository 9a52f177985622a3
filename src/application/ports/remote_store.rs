use crate::domain::entities::{RemoteDocument, TenantFilter};
use crate::domain::value_objects::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Authoritative document store. Each call is one network round-trip.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get(
        &self,
        collection: &str,
        id: &EntityId,
    ) -> Result<Option<RemoteDocument>, AppError>;

    async fn set(&self, collection: &str, document: RemoteDocument) -> Result<(), AppError>;

    /// Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), AppError>;

    async fn query_by_tenant(
        &self,
        collection: &str,
        filter: &TenantFilter,
    ) -> Result<Vec<RemoteDocument>, AppError>;
}
