use super::record_locks::RecordLocks;
use super::tenant_guard::TenantGuard;
use crate::application::ports::{
    DateRange, FieldMatch, LocalStore, LocalWriteListener, RecordQuery, TextSearch,
};
use crate::domain::entities::{Entity, EntityRecord, LocalChange, SyncEntity};
use crate::domain::value_objects::{EntityId, EntityPayload, TenantId};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Screen-level filters, mapped onto the entity's descriptor fields.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
}

impl EntityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn matching(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }
}

/// Typed, tenant-scoped access to one entity type for the UI layer. Every write marks
/// the row dirty and notifies the sync listener.
pub struct EntityRepository<T: SyncEntity> {
    local: Arc<dyn LocalStore>,
    guard: TenantGuard,
    locks: Arc<RecordLocks>,
    listener: Option<Arc<dyn LocalWriteListener>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: SyncEntity> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            guard: self.guard.clone(),
            locks: Arc::clone(&self.locks),
            listener: self.listener.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: SyncEntity> EntityRepository<T> {
    pub fn new(local: Arc<dyn LocalStore>, guard: TenantGuard, locks: Arc<RecordLocks>) -> Self {
        Self {
            local,
            guard,
            locks,
            listener: None,
            _entity: PhantomData,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn LocalWriteListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub async fn create(&self, data: T) -> Result<Entity<T>, AppError> {
        self.create_with_id(EntityId::generate(), data).await
    }

    pub async fn create_with_id(&self, id: EntityId, data: T) -> Result<Entity<T>, AppError> {
        let tenant = self.guard.require_tenant()?;
        let payload = encode(&data)?;
        let _lock = self.locks.lock(&tenant, &T::entity_type(), &id).await;

        if self.local.get(&tenant, &T::entity_type(), &id).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "{} {id} already exists",
                T::entity_type()
            )));
        }

        let record = EntityRecord::new_local(T::entity_type(), id, tenant.clone(), payload);
        let stored = self.local.upsert(record).await?;
        self.notify(&tenant);
        decode(&stored)
    }

    pub async fn update(&self, id: &EntityId, data: T) -> Result<Entity<T>, AppError> {
        let payload = encode(&data)?;
        self.write(id, |record| {
            ensure_immutable_fields_kept::<T>(&record.payload, &payload)?;
            record.touch(payload);
            Ok(())
        })
        .await
    }

    /// Read-modify-write under the record lock.
    pub async fn modify<F>(&self, id: &EntityId, change: F) -> Result<Entity<T>, AppError>
    where
        F: FnOnce(&mut T) + Send,
    {
        self.write(id, |record| {
            let mut data =
                T::from_payload(&record.payload).map_err(AppError::DeserializationError)?;
            change(&mut data);
            let payload = encode(&data)?;
            ensure_immutable_fields_kept::<T>(&record.payload, &payload)?;
            record.touch(payload);
            Ok(())
        })
        .await
    }

    /// Hides the row and queues the remote delete.
    pub async fn soft_delete(&self, id: &EntityId) -> Result<(), AppError> {
        let tenant = self.guard.require_tenant()?;
        let _lock = self.locks.lock(&tenant, &T::entity_type(), id).await;
        let existing = self
            .local
            .get(&tenant, &T::entity_type(), id)
            .await?
            .filter(|record| !record.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("{} {id}", T::entity_type())))?;
        self.guard.ensure_owned(&tenant, &existing)?;

        self.local
            .soft_delete(&tenant, &T::entity_type(), id)
            .await?;
        self.notify(&tenant);
        Ok(())
    }

    /// Soft-deleted rows read as absent.
    pub async fn get(&self, id: &EntityId) -> Result<Option<Entity<T>>, AppError> {
        let tenant = self.guard.require_tenant()?;
        self.local
            .get(&tenant, &T::entity_type(), id)
            .await?
            .filter(|record| !record.is_deleted)
            .map(|record| decode(&record))
            .transpose()
    }

    pub async fn list(&self, filter: &EntityFilter) -> Result<Vec<Entity<T>>, AppError> {
        let tenant = self.guard.require_tenant()?;
        let query = build_query::<T>(filter)?;
        self.local
            .query(&tenant, &T::entity_type(), &query)
            .await?
            .iter()
            .map(decode)
            .collect()
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        let tenant = self.guard.require_tenant()?;
        self.local.count(&tenant, &T::entity_type(), false).await
    }

    /// Rows still waiting for the remote, tombstones included.
    pub async fn pending_sync(&self) -> Result<Vec<Entity<T>>, AppError> {
        let tenant = self.guard.require_tenant()?;
        self.local
            .list_needing_sync(&tenant, &T::entity_type())
            .await?
            .iter()
            .map(decode)
            .collect()
    }

    /// Local store change feed; callers filter by entity type and tenant.
    pub fn subscribe(&self) -> broadcast::Receiver<LocalChange> {
        self.local.subscribe()
    }

    async fn write<F>(&self, id: &EntityId, apply: F) -> Result<Entity<T>, AppError>
    where
        F: FnOnce(&mut EntityRecord) -> Result<(), AppError> + Send,
    {
        let tenant = self.guard.require_tenant()?;
        let _lock = self.locks.lock(&tenant, &T::entity_type(), id).await;
        let mut record = self
            .local
            .get(&tenant, &T::entity_type(), id)
            .await?
            .filter(|record| !record.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("{} {id}", T::entity_type())))?;
        self.guard.ensure_owned(&tenant, &record)?;

        apply(&mut record)?;
        let stored = self.local.update(record).await?;
        self.notify(&tenant);
        decode(&stored)
    }

    fn notify(&self, tenant: &TenantId) {
        if let Some(listener) = &self.listener {
            listener.on_local_write(tenant, &T::entity_type());
        }
    }
}

fn encode<T: SyncEntity>(data: &T) -> Result<EntityPayload, AppError> {
    data.to_payload().map_err(AppError::SerializationError)
}

fn decode<T: SyncEntity>(record: &EntityRecord) -> Result<Entity<T>, AppError> {
    Entity::from_record(record).map_err(AppError::DeserializationError)
}

fn ensure_immutable_fields_kept<T: SyncEntity>(
    current: &EntityPayload,
    next: &EntityPayload,
) -> Result<(), AppError> {
    for field in T::descriptor().immutable_fields {
        if current.get(field) != next.get(field) {
            return Err(AppError::ValidationError(format!(
                "{}.{field} cannot change after creation",
                T::entity_type()
            )));
        }
    }
    Ok(())
}

fn build_query<T: SyncEntity>(filter: &EntityFilter) -> Result<RecordQuery, AppError> {
    let descriptor = T::descriptor();
    let mut query = RecordQuery {
        include_deleted: filter.include_deleted,
        limit: filter.limit,
        ..RecordQuery::default()
    };

    if let Some(status) = &filter.status {
        let field = descriptor.status_field.ok_or_else(|| {
            AppError::ValidationError(format!("{} has no status field", descriptor.entity_type))
        })?;
        query.status = Some(FieldMatch {
            field: field.to_string(),
            value: status.clone(),
        });
    }

    if filter.from.is_some() || filter.to.is_some() {
        let field = descriptor.date_field.ok_or_else(|| {
            AppError::ValidationError(format!("{} has no date field", descriptor.entity_type))
        })?;
        query.date_range = Some(DateRange {
            field: field.to_string(),
            from: filter.from,
            to: filter.to,
        });
    }

    if let Some(needle) = filter.search.as_deref().map(str::trim)
        && !needle.is_empty()
    {
        if descriptor.search_fields.is_empty() {
            return Err(AppError::ValidationError(format!(
                "{} is not searchable",
                descriptor.entity_type
            )));
        }
        query.text = Some(TextSearch {
            fields: descriptor.search_fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.to_string(),
        });
    }

    Ok(query)
}
