mod common;

use bizsync::application::ports::RemoteStore;
use bizsync::application::services::EntityFilter;
use bizsync::domain::entities::business::{Customer, Note};
use bizsync::domain::entities::{PushSummary, SyncEntity};
use bizsync::infrastructure::remote::InMemoryRemoteStore;
use bizsync::shared::AppError;
use common::mocks::MockRemoteStorePort;
use common::{
    TestHarness, customer_type, id, setup, setup_online, setup_with_remote, test_config,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Offline harness whose engine talks to `port`; flip it online once rows are staged.
async fn setup_with_port(port: MockRemoteStorePort) -> TestHarness {
    let port: Arc<dyn RemoteStore> = Arc::new(port);
    setup_with_remote(test_config(), false, Arc::new(InMemoryRemoteStore::new()), port).await
}

#[tokio::test]
async fn customer_created_offline_is_visible_then_pushed_clean() {
    let harness = setup().await;
    let customers = harness.state.repository::<Customer>();

    let created = customers
        .create_with_id(id("c1"), Customer::named("Ayşe"))
        .await
        .unwrap();
    assert!(created.needs_sync);

    let listed = customers.list(&EntityFilter::all()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].data.name, "Ayşe");

    let offline = harness
        .state
        .engine
        .sync_all(&harness.tenant(), &customer_type())
        .await;
    assert!(matches!(offline, Err(AppError::NoConnectivity(_))));
    assert!(customers.get(&id("c1")).await.unwrap().unwrap().needs_sync);

    harness.go_online();
    let report = harness
        .state
        .engine
        .sync_all(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    assert_eq!(report.pushed, PushSummary::new(1, 0));
    assert_eq!(report.pulled.unchanged, 1);

    let remote = harness.remote.document("customers", &id("c1")).await.unwrap();
    assert_eq!(remote.str_field("tenantId"), Some("biz-1"));
    assert_eq!(remote.str_field("name"), Some("Ayşe"));
    assert!(!customers.get(&id("c1")).await.unwrap().unwrap().needs_sync);
}

#[tokio::test]
async fn local_write_while_online_is_pushed_in_the_background() {
    let harness = setup_online().await;
    let notes = harness.state.repository::<Note>();

    let note = notes
        .create(Note {
            title: "Open late on Friday".into(),
            body: String::new(),
            customer_id: None,
            pinned: true,
        })
        .await
        .unwrap();

    harness.state.scheduler.wait_idle().await;

    assert!(harness.remote.document("notes", &note.id).await.is_some());
    assert!(!notes.get(&note.id).await.unwrap().unwrap().needs_sync);
}

#[tokio::test]
async fn soft_delete_hides_locally_then_purges_after_push() {
    let harness = setup().await;
    let customers = harness.state.repository::<Customer>();
    customers
        .create_with_id(id("c1"), Customer::named("Ayşe"))
        .await
        .unwrap();
    harness.go_online();
    harness
        .state
        .engine
        .push_dirty(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    harness.go_offline();

    customers.soft_delete(&id("c1")).await.unwrap();
    assert!(customers.get(&id("c1")).await.unwrap().is_none());
    assert_eq!(customers.count().await.unwrap(), 0);
    assert!(harness.remote.document("customers", &id("c1")).await.is_some());

    harness.go_online();
    let report = harness
        .state
        .engine
        .sync_all(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    assert_eq!(report.deleted, PushSummary::new(1, 0));
    assert!(harness.remote.document("customers", &id("c1")).await.is_none());
    assert_eq!(
        harness
            .state
            .local_store
            .count(&harness.tenant(), &customer_type(), true)
            .await
            .unwrap(),
        0
    );

    let again = harness
        .state
        .engine
        .sync_all(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    assert!(again.is_noop());
}

#[tokio::test]
async fn rejected_record_stays_dirty_while_the_rest_succeed() {
    let harness = setup().await;
    let customers = harness.state.repository::<Customer>();
    for n in 1..=5 {
        customers
            .create_with_id(id(&format!("c{n}")), Customer::named(format!("Customer {n}")))
            .await
            .unwrap();
    }
    harness.remote.reject(id("c3")).await;
    harness.go_online();

    let summary = harness
        .state
        .engine
        .push_dirty(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    assert_eq!(summary, PushSummary::new(4, 1));

    let pending = customers.pending_sync().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id("c3"));

    harness.remote.accept(&id("c3")).await;
    let retry = harness
        .state
        .engine
        .push_dirty(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    assert_eq!(retry, PushSummary::new(1, 0));
    assert!(customers.pending_sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn slow_remote_times_out_per_record() {
    let mut config = common::test_config();
    config.sync.remote_timeout_ms = 50;
    let harness = common::setup_with(config, false).await;
    let customers = harness.state.repository::<Customer>();
    customers
        .create_with_id(id("c1"), Customer::named("Ayşe"))
        .await
        .unwrap();

    harness
        .remote
        .set_latency(Some(std::time::Duration::from_millis(300)))
        .await;
    harness.go_online();

    let summary = harness
        .state
        .engine
        .push_dirty(&harness.tenant(), &customer_type())
        .await
        .unwrap();
    assert_eq!(summary, PushSummary::new(0, 1));
    assert!(customers.get(&id("c1")).await.unwrap().unwrap().needs_sync);
}

#[tokio::test]
async fn immutable_field_cannot_be_edited() {
    use bizsync::domain::entities::business::Payment;
    use chrono::Utc;

    let harness = setup().await;
    let payments = harness.state.repository::<Payment>();
    let payment = payments
        .create(Payment {
            customer_id: "c1".into(),
            appointment_id: None,
            amount: 250.0,
            method: Default::default(),
            status: Default::default(),
            paid_at: Utc::now(),
        })
        .await
        .unwrap();

    let moved = payments
        .modify(&payment.id, |p| p.customer_id = "c2".into())
        .await;
    assert!(matches!(moved, Err(AppError::ValidationError(_))));

    let refunded = payments
        .modify(&payment.id, |p| p.amount = 0.0)
        .await
        .unwrap();
    assert_eq!(refunded.data.amount, 0.0);
    assert_eq!(Payment::entity_type().as_str(), "payment");
}

#[tokio::test]
async fn tenant_mismatch_from_remote_aborts_push() {
    let mut port = MockRemoteStorePort::new();
    port.expect_set()
        .times(1)
        .returning(|_, _| Err(AppError::tenant_mismatch("biz-1", "biz-2")));
    let harness = setup_with_port(port).await;
    let customers = harness.state.repository::<Customer>();
    for n in 1..=2 {
        customers
            .create_with_id(id(&format!("c{n}")), Customer::named(format!("Customer {n}")))
            .await
            .unwrap();
    }
    harness.go_online();

    let result = harness
        .state
        .engine
        .push_dirty(&harness.tenant(), &customer_type())
        .await;
    assert!(matches!(result, Err(AppError::TenantMismatch { .. })));
    assert_eq!(customers.pending_sync().await.unwrap().len(), 2);
}

#[tokio::test]
async fn tenant_mismatch_from_remote_aborts_delete_push() {
    let mut port = MockRemoteStorePort::new();
    port.expect_delete()
        .times(1)
        .returning(|_, _| Err(AppError::tenant_mismatch("biz-1", "biz-2")));
    let harness = setup_with_port(port).await;
    let customers = harness.state.repository::<Customer>();
    for n in 1..=2 {
        let customer_id = id(&format!("c{n}"));
        customers
            .create_with_id(customer_id.clone(), Customer::named(format!("Customer {n}")))
            .await
            .unwrap();
        customers.soft_delete(&customer_id).await.unwrap();
    }
    harness.go_online();

    let result = harness
        .state
        .engine
        .push_deletes(&harness.tenant(), &customer_type())
        .await;
    assert!(matches!(result, Err(AppError::TenantMismatch { .. })));
    assert_eq!(
        harness
            .state
            .local_store
            .count(&harness.tenant(), &customer_type(), true)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn sync_all_keeps_pushed_rows_clean_when_pull_loses_connectivity() {
    let mut port = MockRemoteStorePort::new();
    port.expect_set().times(1).returning(|_, _| Ok(()));
    port.expect_query_by_tenant()
        .times(1)
        .returning(|_, _| Err(AppError::NoConnectivity("link dropped".into())));
    let harness = setup_with_port(port).await;
    let customers = harness.state.repository::<Customer>();
    customers
        .create_with_id(id("c1"), Customer::named("Ayşe"))
        .await
        .unwrap();
    harness.go_online();

    let result = harness
        .state
        .engine
        .sync_all(&harness.tenant(), &customer_type())
        .await;
    assert!(matches!(result, Err(AppError::NoConnectivity(_))));
    assert!(!customers.get(&id("c1")).await.unwrap().unwrap().needs_sync);
    assert!(customers.pending_sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_push_leaves_every_row_dirty() {
    let harness = setup().await;
    let customers = harness.state.repository::<Customer>();
    for n in 1..=2 {
        customers
            .create_with_id(id(&format!("c{n}")), Customer::named(format!("Customer {n}")))
            .await
            .unwrap();
    }
    harness.go_online();

    let token = CancellationToken::new();
    token.cancel();
    let result = harness
        .state
        .engine
        .push_dirty_with(&harness.tenant(), &customer_type(), &token)
        .await;
    assert!(matches!(result, Err(AppError::Cancelled(_))));
    assert_eq!(harness.remote.write_count(), 0);
    assert_eq!(customers.pending_sync().await.unwrap().len(), 2);
}

#[tokio::test]
async fn push_cancelled_mid_pass_only_clears_confirmed_rows() {
    let harness = setup().await;
    let customers = harness.state.repository::<Customer>();
    for n in 1..=3 {
        customers
            .create_with_id(id(&format!("c{n}")), Customer::named(format!("Customer {n}")))
            .await
            .unwrap();
    }
    harness.remote.set_latency(Some(Duration::from_millis(40))).await;
    harness.go_online();

    let token = CancellationToken::new();
    let tenant = harness.tenant();
    let entity_type = customer_type();
    let (result, ()) = tokio::join!(
        harness
            .state
            .engine
            .push_dirty_with(&tenant, &entity_type, &token),
        async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            token.cancel();
        }
    );
    assert!(matches!(result, Err(AppError::Cancelled(_))));

    let confirmed = harness.remote.write_count();
    assert!((1..3).contains(&confirmed));
    let pending = customers.pending_sync().await.unwrap();
    assert_eq!(pending.len(), 3 - confirmed);
    for customer in &pending {
        assert!(harness.remote.document("customers", &customer.id).await.is_none());
    }
}
