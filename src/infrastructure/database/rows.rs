use crate::domain::entities::EntityRecord;
use crate::domain::value_objects::{EntityId, EntityPayload, EntityType, TenantId};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct EntityRecordRow {
    pub entity_type: String,
    pub id: String,
    pub tenant_id: String,
    pub payload: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_deleted: bool,
    pub needs_sync: bool,
    pub local_version: i64,
}

impl EntityRecordRow {
    pub fn into_record(self) -> Result<EntityRecord, AppError> {
        Ok(EntityRecord {
            entity_type: EntityType::new(self.entity_type).map_err(AppError::Database)?,
            id: EntityId::new(self.id).map_err(AppError::Database)?,
            tenant_id: TenantId::new(self.tenant_id).map_err(AppError::Database)?,
            payload: EntityPayload::from_json_str(&self.payload)
                .map_err(AppError::DeserializationError)?,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
            is_deleted: self.is_deleted,
            needs_sync: self.needs_sync,
            local_version: self.local_version,
        })
    }
}

fn from_millis(value: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp: {value}")))
}
