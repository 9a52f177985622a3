use crate::application::ports::RemoteStore;
use crate::domain::entities::{RemoteDocument, TenantFilter};
use crate::domain::value_objects::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

type Collection = BTreeMap<EntityId, RemoteDocument>;

/// Document store kept in process memory. Backs local development and the test suite,
/// with switches for reachability, per-document rejection and latency.
pub struct InMemoryRemoteStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    reachable: AtomicBool,
    rejected: RwLock<HashSet<EntityId>>,
    latency: RwLock<Option<Duration>>,
    writes: AtomicUsize,
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            reachable: AtomicBool::new(true),
            rejected: RwLock::new(HashSet::new()),
            latency: RwLock::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Writes and deletes of `id` fail with `RemoteRejected` until [`Self::accept`].
    pub async fn reject(&self, id: EntityId) {
        self.rejected.write().await.insert(id);
    }

    pub async fn accept(&self, id: &EntityId) {
        self.rejected.write().await.remove(id);
    }

    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    /// Stores a document as-is, bypassing reachability and rejection.
    pub async fn seed(&self, collection: &str, document: RemoteDocument) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
    }

    pub async fn document(&self, collection: &str, id: &EntityId) -> Option<RemoteDocument> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub async fn documents(&self, collection: &str) -> Vec<RemoteDocument> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Successful `set` calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) -> Result<(), AppError> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(AppError::NoConnectivity(
                "remote store unreachable".to_string(),
            ));
        }
        Ok(())
    }

    async fn ensure_accepted(&self, collection: &str, id: &EntityId) -> Result<(), AppError> {
        if self.rejected.read().await.contains(id) {
            return Err(AppError::RemoteRejected(format!(
                "{collection}/{id} rejected by remote"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn get(
        &self,
        collection: &str,
        id: &EntityId,
    ) -> Result<Option<RemoteDocument>, AppError> {
        self.round_trip().await?;
        Ok(self.document(collection, id).await)
    }

    async fn set(&self, collection: &str, document: RemoteDocument) -> Result<(), AppError> {
        self.round_trip().await?;
        self.ensure_accepted(collection, &document.id).await?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), AppError> {
        self.round_trip().await?;
        self.ensure_accepted(collection, id).await?;
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query_by_tenant(
        &self,
        collection: &str,
        filter: &TenantFilter,
    ) -> Result<Vec<RemoteDocument>, AppError> {
        self.round_trip().await?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
