#![allow(dead_code)]

pub mod mocks;

use bizsync::AppState;
use bizsync::application::ports::{ConnectivityMonitor, RemoteStore};
use bizsync::domain::entities::RemoteDocument;
use bizsync::domain::value_objects::{ConflictPolicy, EntityId, EntityType, TenantId};
use bizsync::infrastructure::connectivity::ManualConnectivityMonitor;
use bizsync::infrastructure::database::ConnectionPool;
use bizsync::infrastructure::remote::InMemoryRemoteStore;
use bizsync::infrastructure::tenant::SessionTenantContext;
use bizsync::shared::AppConfig;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const TENANT: &str = "biz-1";
pub const OTHER_TENANT: &str = "biz-2";

pub struct TestHarness {
    pub state: AppState,
    pub remote: Arc<InMemoryRemoteStore>,
    pub session: Arc<SessionTenantContext>,
    pub connectivity: Arc<ManualConnectivityMonitor>,
}

impl TestHarness {
    pub fn tenant(&self) -> TenantId {
        tenant(TENANT)
    }

    pub fn go_online(&self) {
        self.connectivity.set_connected(true);
    }

    pub fn go_offline(&self) {
        self.connectivity.set_connected(false);
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.sync.auto_sync = false;
    config.sync.remote_timeout_ms = 2_000;
    config
}

/// Signed in as [`TENANT`], offline, no background tasks running.
pub async fn setup() -> TestHarness {
    setup_with(test_config(), false).await
}

pub async fn setup_online() -> TestHarness {
    setup_with(test_config(), true).await
}

pub async fn setup_with_policy(policy: ConflictPolicy) -> TestHarness {
    let mut config = test_config();
    config.sync.conflict_policy = policy;
    setup_with(config, false).await
}

pub async fn setup_with(config: AppConfig, online: bool) -> TestHarness {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let port: Arc<dyn RemoteStore> = remote.clone();
    setup_with_remote(config, online, remote, port).await
}

/// `remote` stays reachable for assertions while the engine talks to `port`.
pub async fn setup_with_remote(
    config: AppConfig,
    online: bool,
    remote: Arc<InMemoryRemoteStore>,
    port: Arc<dyn RemoteStore>,
) -> TestHarness {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    let session = Arc::new(SessionTenantContext::signed_in(tenant(TENANT)));
    let connectivity = Arc::new(ManualConnectivityMonitor::new(online));
    let monitor: Arc<dyn ConnectivityMonitor> = connectivity.clone();

    let state = AppState::with_pool(config, pool, port, session.clone(), monitor)
        .await
        .expect("app state");

    TestHarness {
        state,
        remote,
        session,
        connectivity,
    }
}

pub fn tenant(value: &str) -> TenantId {
    TenantId::parse(value).expect("tenant id")
}

pub fn id(value: &str) -> EntityId {
    EntityId::parse(value).expect("entity id")
}

pub fn customer_type() -> EntityType {
    EntityType::parse("customer").expect("entity type")
}

pub fn remote_doc(id_value: &str, fields: Value) -> RemoteDocument {
    let Value::Object(fields) = fields else {
        panic!("remote document fields must be an object");
    };
    RemoteDocument::new(id(id_value), fields)
}

pub fn remote_customer(
    id_value: &str,
    tenant_value: &str,
    name: &str,
    updated_ms: i64,
) -> RemoteDocument {
    remote_doc(
        id_value,
        json!({
            "tenantId": tenant_value,
            "name": name,
            "status": "active",
            "createdAt": 1_700_000_000_000_i64,
            "updatedAt": updated_ms,
        }),
    )
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
