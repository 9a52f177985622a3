use super::adapter_registry::AdapterRegistry;
use super::conflict_resolution::{Reconciliation, reconcile};
use super::record_locks::RecordLocks;
use super::tenant_guard::TenantGuard;
use crate::application::ports::{ConnectivityMonitor, LocalStore, RemoteStore};
use crate::domain::entities::{PullSummary, PushSummary, SyncReport, TenantFilter};
use crate::domain::value_objects::{ConflictPolicy, EntityType, TenantId};
use crate::shared::error::AppError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Generic push/pull algorithm shared by every registered entity type.
pub struct SyncEngine {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    registry: Arc<AdapterRegistry>,
    guard: TenantGuard,
    connectivity: Arc<dyn ConnectivityMonitor>,
    locks: Arc<RecordLocks>,
    policy: ConflictPolicy,
    remote_timeout: Duration,
}

impl SyncEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        registry: Arc<AdapterRegistry>,
        guard: TenantGuard,
        connectivity: Arc<dyn ConnectivityMonitor>,
        locks: Arc<RecordLocks>,
        policy: ConflictPolicy,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            local,
            remote,
            registry,
            guard,
            connectivity,
            locks,
            policy,
            remote_timeout,
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub async fn push_dirty(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
    ) -> Result<PushSummary, AppError> {
        self.push_dirty_with(tenant, entity_type, &CancellationToken::new())
            .await
    }

    /// Uploads every dirty, non-deleted row. Per-record failures are counted and leave
    /// the row dirty; losing connectivity or a tenant violation aborts the step.
    pub async fn push_dirty_with(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        cancel: &CancellationToken,
    ) -> Result<PushSummary, AppError> {
        let tenant = self.guard.authorize(tenant)?;
        let adapter = self.registry.get(entity_type)?;
        self.ensure_online("push_dirty")?;

        let dirty = self.local.list_needing_sync(&tenant, entity_type).await?;
        let mut summary = PushSummary::default();

        for record in dirty.into_iter().filter(|record| !record.is_deleted) {
            check_cancelled(cancel, "push_dirty")?;
            self.guard.ensure_owned(&tenant, &record)?;

            let document = match adapter.to_remote(&record) {
                Ok(document) => document,
                Err(err) => {
                    tracing::warn!(
                        target: "sync::engine",
                        %entity_type,
                        id = %record.id,
                        error = %err,
                        "record could not be encoded, left dirty"
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            match self
                .remote_call("set", self.remote.set(adapter.collection(), document))
                .await
            {
                Ok(()) => {
                    let cleared = self
                        .local
                        .mark_synced(&tenant, entity_type, &record.id, record.local_version)
                        .await?;
                    if !cleared {
                        tracing::debug!(
                            target: "sync::engine",
                            %entity_type,
                            id = %record.id,
                            "record changed during push, stays dirty"
                        );
                    }
                    summary.succeeded += 1;
                }
                Err(err) if aborts_batch(&err) => {
                    tracing::warn!(
                        target: "sync::engine",
                        %entity_type,
                        succeeded = summary.succeeded,
                        error = %err,
                        "push aborted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "sync::engine",
                        %entity_type,
                        id = %record.id,
                        error = %err,
                        "push failed, record left dirty"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            target: "sync::engine",
            tenant = %tenant,
            %entity_type,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "push_dirty completed"
        );
        Ok(summary)
    }

    pub async fn push_deletes(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
    ) -> Result<PushSummary, AppError> {
        self.push_deletes_with(tenant, entity_type, &CancellationToken::new())
            .await
    }

    /// Deletes tombstoned rows remotely, then purges them locally.
    pub async fn push_deletes_with(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        cancel: &CancellationToken,
    ) -> Result<PushSummary, AppError> {
        let tenant = self.guard.authorize(tenant)?;
        let adapter = self.registry.get(entity_type)?;
        self.ensure_online("push_deletes")?;

        let tombstones = self.local.list_needing_sync(&tenant, entity_type).await?;
        let mut summary = PushSummary::default();

        for record in tombstones.into_iter().filter(|record| record.is_deleted) {
            check_cancelled(cancel, "push_deletes")?;
            self.guard.ensure_owned(&tenant, &record)?;

            match self
                .remote_call("delete", self.remote.delete(adapter.collection(), &record.id))
                .await
            {
                Ok(()) => {
                    let _lock = self.locks.lock(&tenant, entity_type, &record.id).await;
                    self.local
                        .hard_delete(&tenant, entity_type, &record.id)
                        .await?;
                    summary.succeeded += 1;
                }
                Err(err) if aborts_batch(&err) => {
                    tracing::warn!(
                        target: "sync::engine",
                        %entity_type,
                        succeeded = summary.succeeded,
                        error = %err,
                        "delete push aborted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "sync::engine",
                        %entity_type,
                        id = %record.id,
                        error = %err,
                        "remote delete failed, tombstone kept"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            target: "sync::engine",
            tenant = %tenant,
            %entity_type,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "push_deletes completed"
        );
        Ok(summary)
    }

    pub async fn pull(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
    ) -> Result<PullSummary, AppError> {
        self.pull_with(tenant, entity_type, &CancellationToken::new())
            .await
    }

    /// Downloads the tenant's documents and reconciles them into the local store.
    ///
    /// Every document is decoded and tenant-checked before the first local write, so a
    /// foreign document rejects the whole batch.
    pub async fn pull_with(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        cancel: &CancellationToken,
    ) -> Result<PullSummary, AppError> {
        let tenant = self.guard.authorize(tenant)?;
        let adapter = self.registry.get(entity_type)?;
        self.ensure_online("pull")?;

        let filter = TenantFilter::new(adapter.tenant_field(), tenant.clone());
        let documents = self
            .remote_call(
                "query",
                self.remote.query_by_tenant(adapter.collection(), &filter),
            )
            .await?;

        let mut summary = PullSummary::default();
        let mut incoming = Vec::with_capacity(documents.len());
        for document in &documents {
            match adapter.from_remote(document) {
                Ok(translated) => {
                    if translated.record.tenant_id != tenant {
                        tracing::error!(
                            target: "sync::engine",
                            tenant = %tenant,
                            found = %translated.record.tenant_id,
                            %entity_type,
                            id = %document.id,
                            "remote returned a document of another tenant, pull rejected"
                        );
                        return Err(AppError::tenant_mismatch(
                            tenant.as_str(),
                            translated.record.tenant_id.as_str(),
                        ));
                    }
                    summary.fallbacks += translated.fallbacks.len() as u32;
                    incoming.push(translated.record);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "sync::engine",
                        %entity_type,
                        id = %document.id,
                        error = %err,
                        "remote document skipped"
                    );
                    summary.skipped += 1;
                }
            }
        }

        for remote_record in incoming {
            check_cancelled(cancel, "pull")?;
            let _lock = self.locks.lock(&tenant, entity_type, &remote_record.id).await;
            let local = self
                .local
                .get(&tenant, entity_type, &remote_record.id)
                .await?;

            match reconcile(self.policy, local.as_ref(), remote_record) {
                Reconciliation::Insert(record) => {
                    self.local.upsert(record).await?;
                    summary.inserted += 1;
                }
                Reconciliation::Update(record) => {
                    self.local.upsert(record).await?;
                    summary.updated += 1;
                }
                Reconciliation::Unchanged => summary.unchanged += 1,
                Reconciliation::Deferred(reason) => {
                    tracing::debug!(
                        target: "sync::engine",
                        %entity_type,
                        ?reason,
                        "remote row deferred"
                    );
                    summary.deferred += 1;
                }
            }
        }

        tracing::info!(
            target: "sync::engine",
            tenant = %tenant,
            %entity_type,
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            deferred = summary.deferred,
            skipped = summary.skipped,
            fallbacks = summary.fallbacks,
            "pull completed"
        );
        Ok(summary)
    }

    /// Push-only pass used after local writes.
    pub async fn push_pending_with(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, AppError> {
        let pushed = self.push_dirty_with(tenant, entity_type, cancel).await?;
        let deleted = self.push_deletes_with(tenant, entity_type, cancel).await?;
        Ok(SyncReport {
            pushed,
            deleted,
            pulled: PullSummary::default(),
        })
    }

    pub async fn sync_all(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
    ) -> Result<SyncReport, AppError> {
        self.sync_all_with(tenant, entity_type, &CancellationToken::new())
            .await
    }

    /// Push, then deletes, then pull. Steps already completed keep their effects when a
    /// later step fails.
    pub async fn sync_all_with(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, AppError> {
        let pushed = self.push_dirty_with(tenant, entity_type, cancel).await?;
        let deleted = self.push_deletes_with(tenant, entity_type, cancel).await?;
        let pulled = self.pull_with(tenant, entity_type, cancel).await?;
        Ok(SyncReport {
            pushed,
            deleted,
            pulled,
        })
    }

    fn ensure_online(&self, operation: &str) -> Result<(), AppError> {
        if self.connectivity.is_currently_connected() {
            Ok(())
        } else {
            Err(AppError::NoConnectivity(format!(
                "{operation}: network unavailable"
            )))
        }
    }

    /// Connectivity check and timeout around a single remote round-trip.
    async fn remote_call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        self.ensure_online(operation)?;
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(match err {
                AppError::NoConnectivity(_)
                | AppError::RemoteRejected(_)
                | AppError::Timeout(_)
                | AppError::TenantMismatch { .. }
                | AppError::NotAuthenticated => err,
                other => AppError::RemoteRejected(format!("{operation}: {other}")),
            }),
            Err(_) => Err(AppError::Timeout(format!(
                "{operation} exceeded {}ms",
                self.remote_timeout.as_millis()
            ))),
        }
    }
}

/// Errors that end a push step instead of counting against a single record.
fn aborts_batch(err: &AppError) -> bool {
    err.is_unavailable() || err.is_isolation_violation()
}

fn check_cancelled(cancel: &CancellationToken, operation: &str) -> Result<(), AppError> {
    if cancel.is_cancelled() {
        tracing::debug!(target: "sync::engine", operation, "sync pass cancelled");
        return Err(AppError::Cancelled(operation.to_string()));
    }
    Ok(())
}
