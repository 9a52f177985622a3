use crate::application::ports::{ConnectivityMonitor, LocalStore, RemoteStore, TenantContext};
use crate::application::services::{
    AdapterRegistry, EntityRepository, RecordLocks, SchedulerSettings, SyncEngine, SyncScheduler,
    TenantGuard,
};
use crate::domain::entities::SyncEntity;
use crate::infrastructure::database::{ConnectionPool, SqliteLocalStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything a host application needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: ConnectionPool,
    pub local_store: Arc<dyn LocalStore>,
    pub remote_store: Arc<dyn RemoteStore>,
    pub registry: Arc<AdapterRegistry>,
    pub engine: Arc<SyncEngine>,
    pub scheduler: SyncScheduler,
    guard: TenantGuard,
    locks: Arc<RecordLocks>,
}

impl AppState {
    pub async fn new(
        config: AppConfig,
        remote_store: Arc<dyn RemoteStore>,
        tenant_context: Arc<dyn TenantContext>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;
        let pool = ConnectionPool::from_config(&config.database).await?;
        Self::with_pool(config, pool, remote_store, tenant_context, connectivity).await
    }

    /// Wires the state on top of an existing pool, running migrations first.
    /// The configuration is validated before anything is wired.
    pub async fn with_pool(
        config: AppConfig,
        pool: ConnectionPool,
        remote_store: Arc<dyn RemoteStore>,
        tenant_context: Arc<dyn TenantContext>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;
        pool.migrate().await?;

        let local_store: Arc<dyn LocalStore> = Arc::new(SqliteLocalStore::new(pool.clone()));
        let registry = Arc::new(AdapterRegistry::with_business_entities());
        let guard = TenantGuard::new(tenant_context);
        let locks = Arc::new(RecordLocks::new());

        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&local_store),
            Arc::clone(&remote_store),
            Arc::clone(&registry),
            guard.clone(),
            Arc::clone(&connectivity),
            Arc::clone(&locks),
            config.sync.conflict_policy,
            config.sync.remote_timeout(),
        ));
        let scheduler = SyncScheduler::new(
            Arc::clone(&engine),
            guard.clone(),
            connectivity,
            SchedulerSettings {
                auto_sync: config.sync.auto_sync,
                interval: config.sync.interval(),
            },
        );

        tracing::info!(
            target: "sync::engine",
            entity_types = registry.len(),
            policy = %config.sync.conflict_policy,
            "sync state initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            pool,
            local_store,
            remote_store,
            registry,
            engine,
            scheduler,
            guard,
            locks,
        })
    }

    /// Local CRUD for one entity type; writes trigger a push-only sync.
    pub fn repository<T: SyncEntity>(&self) -> EntityRepository<T> {
        EntityRepository::new(
            Arc::clone(&self.local_store),
            self.guard.clone(),
            Arc::clone(&self.locks),
        )
        .with_listener(Arc::new(self.scheduler.clone()))
    }

    /// Starts background triggers and, when a tenant is signed in, the session sync.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        let handles = self.scheduler.spawn_background();
        match self.scheduler.start_session() {
            Ok(count) => {
                tracing::debug!(target: "sync::scheduler", entity_types = count, "session sync queued");
            }
            Err(err) => {
                tracing::debug!(target: "sync::scheduler", error = %err, "no session yet, waiting for sign-in");
            }
        }
        handles
    }

    pub async fn shutdown(&self) {
        self.scheduler.shutdown();
        self.scheduler.wait_idle().await;
        self.pool.close().await;
    }
}
