use async_trait::async_trait;
use bizsync::application::ports::RemoteStore;
use bizsync::domain::entities::{RemoteDocument, TenantFilter};
use bizsync::domain::value_objects::EntityId;
use bizsync::shared::AppError;
use mockall::mock;

mock! {
    pub RemoteStorePort {}

    #[async_trait]
    impl RemoteStore for RemoteStorePort {
        async fn get(&self, collection: &str, id: &EntityId) -> Result<Option<RemoteDocument>, AppError>;
        async fn set(&self, collection: &str, document: RemoteDocument) -> Result<(), AppError>;
        async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), AppError>;
        async fn query_by_tenant(&self, collection: &str, filter: &TenantFilter) -> Result<Vec<RemoteDocument>, AppError>;
    }
}
