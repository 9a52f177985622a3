use super::sync_engine::SyncEngine;
use super::tenant_guard::TenantGuard;
use crate::application::ports::{ConnectivityMonitor, ConnectivityTransition, LocalWriteListener};
use crate::domain::entities::{SyncReport, timestamp_now};
use crate::domain::value_objects::{EntityType, SyncKey, TenantId};
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, Notify, broadcast::error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A full pass subsumes a push-only pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    PushOnly,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A worker was started for the key.
    Started,
    /// Folded into the pass already queued or running for the key.
    Coalesced,
    /// Not scheduled: no tokio runtime to run the pass on.
    Dropped,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeySyncStatus {
    pub is_syncing: bool,
    pub last_success_at: Option<i64>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub last_report: Option<SyncReport>,
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub auto_sync: bool,
    pub interval: Duration,
}

struct KeySlot {
    gate: Arc<AsyncMutex<()>>,
    queued: Option<SyncMode>,
    worker_active: bool,
    in_flight: Option<(SyncMode, CancellationToken)>,
    status: KeySyncStatus,
}

impl KeySlot {
    fn new() -> Self {
        Self {
            gate: Arc::new(AsyncMutex::new(())),
            queued: None,
            worker_active: false,
            in_flight: None,
            status: KeySyncStatus::default(),
        }
    }
}

struct SchedulerInner {
    engine: Arc<SyncEngine>,
    guard: TenantGuard,
    connectivity: Arc<dyn ConnectivityMonitor>,
    settings: SchedulerSettings,
    slots: Mutex<HashMap<SyncKey, KeySlot>>,
    idle: Notify,
    shutdown: CancellationToken,
}

/// Decides when sync passes run. At most one pass runs per (tenant, entity type);
/// triggers arriving meanwhile collapse into a single follow-up pass.
#[derive(Clone)]
pub struct SyncScheduler {
    inner: Arc<SchedulerInner>,
}

impl SyncScheduler {
    pub fn new(
        engine: Arc<SyncEngine>,
        guard: TenantGuard,
        connectivity: Arc<dyn ConnectivityMonitor>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                engine,
                guard,
                connectivity,
                settings,
                slots: Mutex::new(HashMap::new()),
                idle: Notify::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Queues a pass for `key`. A full request cancels an in-flight push-only pass.
    pub fn request(&self, key: SyncKey, mode: SyncMode) -> TriggerOutcome {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(target: "sync::scheduler", %key, "no runtime, sync request dropped");
            return TriggerOutcome::Dropped;
        };

        let mut slots = self.lock_slots();
        let slot = slots.entry(key.clone()).or_insert_with(KeySlot::new);
        slot.queued = Some(slot.queued.map_or(mode, |queued| queued.max(mode)));

        if let Some((running, token)) = &slot.in_flight
            && mode > *running
        {
            tracing::debug!(target: "sync::scheduler", %key, "push-only pass superseded by full sync");
            token.cancel();
        }

        if slot.worker_active {
            tracing::trace!(target: "sync::scheduler", %key, ?mode, "sync request coalesced");
            return TriggerOutcome::Coalesced;
        }
        slot.worker_active = true;
        drop(slots);

        let scheduler = self.clone();
        handle.spawn(async move { scheduler.run_worker(key).await });
        TriggerOutcome::Started
    }

    /// Full sync of every registered entity type for the signed-in tenant.
    pub fn start_session(&self) -> Result<usize, AppError> {
        let tenant = self.inner.guard.require_tenant()?;
        let entity_types = self.inner.engine.registry().entity_types();
        tracing::info!(
            target: "sync::scheduler",
            tenant = %tenant,
            entity_types = entity_types.len(),
            "session started, scheduling full sync"
        );
        for entity_type in &entity_types {
            self.request(SyncKey::new(tenant.clone(), entity_type.clone()), SyncMode::Full);
        }
        Ok(entity_types.len())
    }

    /// User-initiated full sync. Waits for any pass already running on the key and
    /// returns its own failure to the caller instead of swallowing it.
    pub async fn sync_now(&self, entity_type: &EntityType) -> Result<SyncReport, AppError> {
        let tenant = self.inner.guard.require_tenant()?;
        let key = SyncKey::new(tenant, entity_type.clone());
        let gate = {
            let mut slots = self.lock_slots();
            Arc::clone(&slots.entry(key.clone()).or_insert_with(KeySlot::new).gate)
        };

        let _permit = gate.lock().await;
        self.set_syncing(&key, true);
        let token = self.inner.shutdown.child_token();
        let result = self.execute(&key, SyncMode::Full, &token).await;
        self.record_outcome(&key, &result, true);
        result
    }

    /// Manual sync of every registered entity type; fails if any of them failed.
    pub async fn sync_tenant_now(&self) -> Result<SyncReport, AppError> {
        let entity_types = self.inner.engine.registry().entity_types();
        let results = futures::future::join_all(
            entity_types
                .iter()
                .map(|entity_type| self.sync_now(entity_type)),
        )
        .await;

        let mut combined = SyncReport::default();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(report) => {
                    combined.pushed = combined.pushed.merge(report.pushed);
                    combined.deleted = combined.deleted.merge(report.deleted);
                    combined.pulled.inserted += report.pulled.inserted;
                    combined.pulled.updated += report.pulled.updated;
                    combined.pulled.unchanged += report.pulled.unchanged;
                    combined.pulled.deferred += report.pulled.deferred;
                    combined.pulled.skipped += report.pulled.skipped;
                    combined.pulled.fallbacks += report.pulled.fallbacks;
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(combined),
        }
    }

    /// Starts the connectivity listener and, when auto sync is enabled, the periodic
    /// full sync. Both stop on [`SyncScheduler::shutdown`]. A zero interval disables
    /// the periodic trigger.
    pub fn spawn_background(&self) -> Vec<JoinHandle<()>> {
        let mut handles = vec![self.spawn_connectivity_listener()];
        if self.inner.settings.auto_sync {
            match self.spawn_periodic() {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    tracing::warn!(target: "sync::scheduler", error = %err, "periodic sync not started");
                }
            }
        }
        handles
    }

    pub fn status(&self, key: &SyncKey) -> Option<KeySyncStatus> {
        self.lock_slots().get(key).map(|slot| slot.status.clone())
    }

    pub fn statuses(&self, tenant: &TenantId) -> Vec<(EntityType, KeySyncStatus)> {
        let slots = self.lock_slots();
        let mut statuses: Vec<_> = slots
            .iter()
            .filter(|(key, _)| &key.tenant_id == tenant)
            .map(|(key, slot)| (key.entity_type.clone(), slot.status.clone()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    pub fn is_idle(&self) -> bool {
        self.lock_slots().values().all(|slot| !slot.worker_active)
    }

    /// Resolves once no background pass is running or queued.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Cancels in-flight passes and stops the background triggers.
    pub fn shutdown(&self) {
        tracing::info!(target: "sync::scheduler", "scheduler shutting down");
        self.inner.shutdown.cancel();
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<SyncKey, KeySlot>> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run_worker(self, key: SyncKey) {
        loop {
            let next = {
                let mut slots = self.lock_slots();
                let Some(slot) = slots.get_mut(&key) else {
                    break;
                };
                match slot.queued.take() {
                    Some(mode) if !self.inner.shutdown.is_cancelled() => {
                        let token = self.inner.shutdown.child_token();
                        slot.in_flight = Some((mode, token.clone()));
                        Some((mode, token, Arc::clone(&slot.gate)))
                    }
                    _ => {
                        slot.worker_active = false;
                        slot.in_flight = None;
                        None
                    }
                }
            };
            let Some((mode, token, gate)) = next else {
                break;
            };

            let result = {
                let _permit = gate.lock().await;
                self.set_syncing(&key, true);
                self.execute(&key, mode, &token).await
            };
            if let Some(slot) = self.lock_slots().get_mut(&key) {
                slot.in_flight = None;
            }
            self.record_outcome(&key, &result, false);
        }
        self.inner.idle.notify_waiters();
    }

    async fn execute(
        &self,
        key: &SyncKey,
        mode: SyncMode,
        token: &CancellationToken,
    ) -> Result<SyncReport, AppError> {
        tracing::debug!(target: "sync::scheduler", %key, ?mode, "sync pass started");
        let engine = &self.inner.engine;
        match mode {
            SyncMode::Full => {
                engine
                    .sync_all_with(&key.tenant_id, &key.entity_type, token)
                    .await
            }
            SyncMode::PushOnly => {
                engine
                    .push_pending_with(&key.tenant_id, &key.entity_type, token)
                    .await
            }
        }
    }

    fn set_syncing(&self, key: &SyncKey, syncing: bool) {
        let mut slots = self.lock_slots();
        slots.entry(key.clone()).or_insert_with(KeySlot::new).status.is_syncing = syncing;
    }

    fn record_outcome(&self, key: &SyncKey, result: &Result<SyncReport, AppError>, manual: bool) {
        {
            let mut slots = self.lock_slots();
            let status = &mut slots.entry(key.clone()).or_insert_with(KeySlot::new).status;
            status.is_syncing = false;
            match result {
                Ok(report) => {
                    status.last_success_at = Some(timestamp_now().timestamp_millis());
                    status.last_error = None;
                    status.consecutive_failures = 0;
                    status.last_report = Some(*report);
                }
                Err(AppError::Cancelled(_)) => {}
                Err(err) => {
                    status.last_error = Some(err.to_string());
                    status.consecutive_failures += 1;
                }
            }
        }

        match result {
            Ok(report) if report.is_noop() => {
                tracing::debug!(target: "sync::scheduler", %key, "sync pass found nothing to do");
            }
            Ok(report) => {
                tracing::info!(
                    target: "sync::scheduler",
                    %key,
                    pushed = report.pushed.succeeded,
                    deleted = report.deleted.succeeded,
                    pulled = report.pulled.mutated(),
                    "sync pass completed"
                );
            }
            Err(AppError::Cancelled(_)) => {
                tracing::debug!(target: "sync::scheduler", %key, "sync pass cancelled");
            }
            Err(err) if manual => {
                tracing::error!(target: "sync::scheduler", %key, error = %err, "manual sync failed");
            }
            Err(err) if err.is_isolation_violation() => {
                tracing::warn!(target: "sync::scheduler", %key, error = %err, "background sync rejected");
            }
            Err(err) => {
                tracing::debug!(
                    target: "sync::scheduler",
                    %key,
                    error = %err,
                    "background sync failed, retrying on next trigger"
                );
            }
        }
    }

    fn request_full_for_session(&self, reason: &'static str) {
        let Ok(tenant) = self.inner.guard.require_tenant() else {
            tracing::debug!(target: "sync::scheduler", reason, "no session, trigger ignored");
            return;
        };
        tracing::debug!(target: "sync::scheduler", tenant = %tenant, reason, "full sync triggered");
        for entity_type in self.inner.engine.registry().entity_types() {
            self.request(SyncKey::new(tenant.clone(), entity_type), SyncMode::Full);
        }
    }

    fn spawn_connectivity_listener(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        let mut transitions = self.inner.connectivity.subscribe();
        tokio::spawn(async move {
            let shutdown = scheduler.inner.shutdown.clone();
            let mut online = scheduler.inner.connectivity.is_currently_connected();
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = transitions.recv() => match received {
                        Ok(ConnectivityTransition::Online) => {
                            if !online {
                                scheduler.request_full_for_session("connectivity_restored");
                            }
                            online = true;
                        }
                        Ok(ConnectivityTransition::Offline) => online = false,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(target: "sync::scheduler", skipped, "connectivity events lagged");
                            let now_online = scheduler.inner.connectivity.is_currently_connected();
                            if now_online && !online {
                                scheduler.request_full_for_session("connectivity_restored");
                            }
                            online = now_online;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            tracing::debug!(target: "sync::scheduler", "connectivity listener stopped");
        })
    }

    fn spawn_periodic(&self) -> Result<JoinHandle<()>, AppError> {
        let period = self.inner.settings.interval;
        if period.is_zero() {
            return Err(AppError::ConfigurationError(
                "sync interval must be greater than 0".to_string(),
            ));
        }
        let scheduler = self.clone();
        Ok(tokio::spawn(async move {
            let shutdown = scheduler.inner.shutdown.clone();
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        if scheduler.inner.connectivity.is_currently_connected() {
                            scheduler.request_full_for_session("interval");
                        }
                    }
                }
            }
            tracing::debug!(target: "sync::scheduler", "periodic sync stopped");
        }))
    }
}

impl LocalWriteListener for SyncScheduler {
    fn on_local_write(&self, tenant: &TenantId, entity_type: &EntityType) {
        if !self.inner.connectivity.is_currently_connected() {
            tracing::trace!(target: "sync::scheduler", %entity_type, "offline, write stays queued");
            return;
        }
        self.request(
            SyncKey::new(tenant.clone(), entity_type.clone()),
            SyncMode::PushOnly,
        );
    }
}
