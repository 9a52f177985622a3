use super::connection_pool::ConnectionPool;
use super::queries::*;
use super::rows::EntityRecordRow;
use crate::application::ports::{LocalStore, RecordQuery};
use crate::domain::entities::{EntityRecord, LocalChange, LocalChangeKind, timestamp_now};
use crate::domain::value_objects::{EntityId, EntityType, TenantId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Local row store on top of the `entity_records` table.
pub struct SqliteLocalStore {
    pool: ConnectionPool,
    changes: broadcast::Sender<LocalChange>,
}

impl SqliteLocalStore {
    pub fn new(pool: ConnectionPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { pool, changes }
    }

    fn publish(&self, record: &EntityRecord, kind: LocalChangeKind) {
        self.publish_key(&record.tenant_id, &record.entity_type, &record.id, kind);
    }

    fn publish_key(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
        kind: LocalChangeKind,
    ) {
        // No subscribers is not an error.
        let _ = self.changes.send(LocalChange {
            tenant_id: tenant.clone(),
            entity_type: entity_type.clone(),
            id: id.clone(),
            kind,
        });
    }

    async fn upsert_on(
        conn: &mut SqliteConnection,
        record: &EntityRecord,
    ) -> Result<EntityRecord, AppError> {
        let row = sqlx::query_as::<_, EntityRecordRow>(UPSERT_RECORD)
            .bind(record.entity_type.as_str())
            .bind(record.id.as_str())
            .bind(record.tenant_id.as_str())
            .bind(record.payload.to_json_string())
            .bind(record.created_at.timestamp_millis())
            .bind(record.updated_at.timestamp_millis())
            .bind(record.is_deleted)
            .bind(record.needs_sync)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => row.into_record(),
            None => {
                let owner = sqlx::query_as::<_, EntityRecordRow>(SELECT_RECORD_BY_ID)
                    .bind(record.entity_type.as_str())
                    .bind(record.id.as_str())
                    .fetch_optional(&mut *conn)
                    .await?
                    .map(|row| row.tenant_id)
                    .unwrap_or_default();
                tracing::warn!(
                    target: "sync::store",
                    entity_type = %record.entity_type,
                    id = %record.id,
                    tenant = %record.tenant_id,
                    owner = %owner,
                    "upsert rejected, row owned by another tenant"
                );
                Err(AppError::tenant_mismatch(record.tenant_id.as_str(), owner))
            }
        }
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn query(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        query: &RecordQuery,
    ) -> Result<Vec<EntityRecord>, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(RECORD_COLUMNS);
        builder.push(" FROM entity_records WHERE tenant_id = ");
        builder.push_bind(tenant.as_str());
        builder.push(" AND entity_type = ");
        builder.push_bind(entity_type.as_str());

        if !query.include_deleted {
            builder.push(" AND is_deleted = 0");
        }

        if let Some(status) = &query.status {
            builder.push(" AND json_extract(payload, ");
            builder.push_bind(json_path(&status.field));
            builder.push(") = ");
            builder.push_bind(status.value.as_str());
        }

        if let Some(range) = &query.date_range {
            if let Some(from) = range.from {
                builder.push(" AND json_extract(payload, ");
                builder.push_bind(json_path(&range.field));
                builder.push(") >= ");
                builder.push_bind(from.timestamp_millis());
            }
            if let Some(to) = range.to {
                builder.push(" AND json_extract(payload, ");
                builder.push_bind(json_path(&range.field));
                builder.push(") <= ");
                builder.push_bind(to.timestamp_millis());
            }
        }

        builder.push(" ORDER BY updated_at DESC, id ASC");

        // Text search runs in Rust so case folding covers non-ASCII names.
        if query.text.is_none()
            && let Some(limit) = query.limit
        {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        }

        let rows = builder
            .build_query_as::<EntityRecordRow>()
            .fetch_all(self.pool.get_pool())
            .await?;
        let mut records = rows
            .into_iter()
            .map(EntityRecordRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(text) = &query.text {
            let needle = text.needle.to_lowercase();
            records.retain(|record| {
                text.fields.iter().any(|field| {
                    record
                        .payload
                        .get(field)
                        .and_then(|value| value.as_str())
                        .is_some_and(|value| value.to_lowercase().contains(&needle))
                })
            });
            if let Some(limit) = query.limit {
                records.truncate(limit as usize);
            }
        }

        Ok(records)
    }

    async fn get(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> Result<Option<EntityRecord>, AppError> {
        let row = sqlx::query_as::<_, EntityRecordRow>(SELECT_RECORD_BY_ID)
            .bind(entity_type.as_str())
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) if row.tenant_id != tenant.as_str() => {
                tracing::warn!(
                    target: "sync::store",
                    %entity_type,
                    %id,
                    tenant = %tenant,
                    owner = %row.tenant_id,
                    "read rejected, row owned by another tenant"
                );
                Err(AppError::tenant_mismatch(tenant.as_str(), row.tenant_id))
            }
            Some(row) => row.into_record().map(Some),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: EntityRecord) -> Result<EntityRecord, AppError> {
        let mut conn = self.pool.get_pool().acquire().await?;
        let stored = Self::upsert_on(&mut conn, &record).await?;
        tracing::trace!(
            target: "sync::store",
            entity_type = %stored.entity_type,
            id = %stored.id,
            version = stored.local_version,
            "record upserted"
        );
        self.publish(&stored, LocalChangeKind::Upserted);
        Ok(stored)
    }

    /// All-or-nothing: a row owned by another tenant rolls the batch back.
    async fn upsert_many(&self, records: Vec<EntityRecord>) -> Result<u32, AppError> {
        let mut tx = self.pool.get_pool().begin().await?;
        let mut stored = Vec::with_capacity(records.len());
        for record in &records {
            stored.push(Self::upsert_on(&mut tx, record).await?);
        }
        tx.commit().await?;

        for record in &stored {
            self.publish(record, LocalChangeKind::Upserted);
        }
        tracing::debug!(target: "sync::store", count = stored.len(), "batch upserted");
        Ok(stored.len() as u32)
    }

    async fn update(&self, record: EntityRecord) -> Result<EntityRecord, AppError> {
        let row = sqlx::query_as::<_, EntityRecordRow>(UPDATE_RECORD)
            .bind(record.entity_type.as_str())
            .bind(record.id.as_str())
            .bind(record.tenant_id.as_str())
            .bind(record.payload.to_json_string())
            .bind(record.updated_at.timestamp_millis())
            .bind(record.is_deleted)
            .bind(record.needs_sync)
            .fetch_optional(self.pool.get_pool())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("{} {}", record.entity_type, record.id))
            })?;

        let stored = row.into_record()?;
        self.publish(&stored, LocalChangeKind::Upserted);
        Ok(stored)
    }

    async fn soft_delete(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(SOFT_DELETE_RECORD)
            .bind(entity_type.as_str())
            .bind(id.as_str())
            .bind(tenant.as_str())
            .bind(timestamp_now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.publish_key(tenant, entity_type, id, LocalChangeKind::SoftDeleted);
        }
        Ok(deleted)
    }

    async fn hard_delete(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(HARD_DELETE_RECORD)
            .bind(entity_type.as_str())
            .bind(id.as_str())
            .bind(tenant.as_str())
            .execute(self.pool.get_pool())
            .await?;

        let purged = result.rows_affected() > 0;
        if purged {
            self.publish_key(tenant, entity_type, id, LocalChangeKind::Purged);
        }
        Ok(purged)
    }

    async fn count(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        include_deleted: bool,
    ) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar(COUNT_RECORDS)
            .bind(tenant.as_str())
            .bind(entity_type.as_str())
            .bind(include_deleted)
            .fetch_one(self.pool.get_pool())
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_needing_sync(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
    ) -> Result<Vec<EntityRecord>, AppError> {
        sqlx::query_as::<_, EntityRecordRow>(SELECT_NEEDING_SYNC)
            .bind(tenant.as_str())
            .bind(entity_type.as_str())
            .fetch_all(self.pool.get_pool())
            .await?
            .into_iter()
            .map(EntityRecordRow::into_record)
            .collect()
    }

    async fn mark_synced(
        &self,
        tenant: &TenantId,
        entity_type: &EntityType,
        id: &EntityId,
        local_version: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(MARK_SYNCED)
            .bind(tenant.as_str())
            .bind(entity_type.as_str())
            .bind(id.as_str())
            .bind(local_version)
            .execute(self.pool.get_pool())
            .await?;

        let cleared = result.rows_affected() > 0;
        if cleared {
            self.publish_key(tenant, entity_type, id, LocalChangeKind::Synced);
        }
        Ok(cleared)
    }

    fn subscribe(&self) -> broadcast::Receiver<LocalChange> {
        self.changes.subscribe()
    }
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{DateRange, FieldMatch, TextSearch};
    use crate::domain::value_objects::EntityPayload;
    use chrono::DateTime;

    async fn setup_store() -> SqliteLocalStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteLocalStore::new(pool)
    }

    fn tenant(value: &str) -> TenantId {
        TenantId::parse(value).unwrap()
    }

    fn customer_type() -> EntityType {
        EntityType::parse("customer").unwrap()
    }

    fn record(tenant_id: &str, id: &str, json: &str) -> EntityRecord {
        EntityRecord::new_local(
            customer_type(),
            EntityId::parse(id).unwrap(),
            tenant(tenant_id),
            EntityPayload::from_json_str(json).unwrap(),
        )
    }

    #[tokio::test]
    async fn upsert_bumps_version_and_get_round_trips() {
        let store = setup_store().await;
        let first = store
            .upsert(record("biz-1", "c1", r#"{"name":"Ayşe"}"#))
            .await
            .unwrap();
        assert_eq!(first.local_version, 1);

        let second = store.upsert(first.clone()).await.unwrap();
        assert_eq!(second.local_version, 2);

        let loaded = store
            .get(&tenant("biz-1"), &customer_type(), &first.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn foreign_tenant_cannot_read_or_overwrite() {
        let store = setup_store().await;
        store
            .upsert(record("biz-1", "c1", r#"{"name":"Ayşe"}"#))
            .await
            .unwrap();

        let read = store
            .get(&tenant("biz-2"), &customer_type(), &EntityId::parse("c1").unwrap())
            .await;
        assert!(matches!(read, Err(AppError::TenantMismatch { .. })));

        let write = store
            .upsert(record("biz-2", "c1", r#"{"name":"Mallory"}"#))
            .await;
        assert!(matches!(write, Err(AppError::TenantMismatch { .. })));

        let kept = store
            .get(&tenant("biz-1"), &customer_type(), &EntityId::parse("c1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.payload.get("name").and_then(|v| v.as_str()), Some("Ayşe"));
    }

    #[tokio::test]
    async fn mark_synced_respects_local_version() {
        let store = setup_store().await;
        let stored = store
            .upsert(record("biz-1", "c1", r#"{"name":"Ayşe"}"#))
            .await
            .unwrap();
        let mut edited = stored.clone();
        edited.touch(EntityPayload::from_json_str(r#"{"name":"Ayşe Y."}"#).unwrap());
        store.update(edited).await.unwrap();

        let stale = store
            .mark_synced(&tenant("biz-1"), &customer_type(), &stored.id, stored.local_version)
            .await
            .unwrap();
        assert!(!stale);
        assert_eq!(
            store
                .list_needing_sync(&tenant("biz-1"), &customer_type())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn soft_delete_hides_row_but_keeps_tombstone() {
        let store = setup_store().await;
        let stored = store
            .upsert(record("biz-1", "c1", r#"{"name":"Ayşe"}"#))
            .await
            .unwrap();
        let mut changes = store.subscribe();

        assert!(store
            .soft_delete(&tenant("biz-1"), &customer_type(), &stored.id)
            .await
            .unwrap());
        assert_eq!(changes.recv().await.unwrap().kind, LocalChangeKind::SoftDeleted);

        assert_eq!(store.count(&tenant("biz-1"), &customer_type(), false).await.unwrap(), 0);
        assert_eq!(store.count(&tenant("biz-1"), &customer_type(), true).await.unwrap(), 1);
        let pending = store
            .list_needing_sync(&tenant("biz-1"), &customer_type())
            .await
            .unwrap();
        assert!(pending[0].is_pending_delete());
    }

    #[tokio::test]
    async fn query_filters_by_status_date_and_text() {
        let store = setup_store().await;
        store
            .upsert_many(vec![
                record("biz-1", "c1", r#"{"name":"Ayşe","status":"active","seenAt":1000}"#),
                record("biz-1", "c2", r#"{"name":"Mehmet","status":"blocked","seenAt":2000}"#),
                record("biz-1", "c3", r#"{"name":"AYŞEGÜL","status":"active","seenAt":3000}"#),
                record("biz-2", "c4", r#"{"name":"Ayşe","status":"active","seenAt":1000}"#),
            ])
            .await
            .unwrap();

        let active = store
            .query(
                &tenant("biz-1"),
                &customer_type(),
                &RecordQuery {
                    status: Some(FieldMatch {
                        field: "status".into(),
                        value: "active".into(),
                    }),
                    ..RecordQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 2);

        let ranged = store
            .query(
                &tenant("biz-1"),
                &customer_type(),
                &RecordQuery {
                    date_range: Some(DateRange {
                        field: "seenAt".into(),
                        from: DateTime::from_timestamp_millis(1500),
                        to: None,
                    }),
                    ..RecordQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);

        let searched = store
            .query(
                &tenant("biz-1"),
                &customer_type(),
                &RecordQuery {
                    text: Some(TextSearch {
                        fields: vec!["name".into()],
                        needle: "ayşe".into(),
                    }),
                    ..RecordQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(searched.len(), 2);
        assert!(searched.iter().all(|r| r.tenant_id == tenant("biz-1")));
    }
}
