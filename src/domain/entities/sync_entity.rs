use crate::domain::entities::remote_document::FIELD_TENANT_ID;
use crate::domain::value_objects::{EntityId, EntityPayload, EntityType, TenantId};
use crate::domain::entities::EntityRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An enum-like payload field, its accepted raw values and the default used when a
/// remote value is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumField {
    pub name: &'static str,
    pub values: &'static [&'static str],
    pub default: &'static str,
}

impl EnumField {
    pub fn accepts(&self, raw: &str) -> bool {
        self.values.contains(&raw)
    }
}

/// Static metadata the sync engine needs about one entity type.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub entity_type: &'static str,
    pub collection: &'static str,
    pub tenant_field: &'static str,
    pub status_field: Option<&'static str>,
    pub date_field: Option<&'static str>,
    pub search_fields: &'static [&'static str],
    pub enum_fields: &'static [EnumField],
    pub immutable_fields: &'static [&'static str],
}

impl EntityDescriptor {
    pub const fn new(entity_type: &'static str, collection: &'static str) -> Self {
        Self {
            entity_type,
            collection,
            tenant_field: FIELD_TENANT_ID,
            status_field: None,
            date_field: None,
            search_fields: &[],
            enum_fields: &[],
            immutable_fields: &[],
        }
    }

    pub fn entity_type(&self) -> EntityType {
        EntityType::from_static(self.entity_type)
    }

    pub fn enum_field(&self, name: &str) -> Option<&EnumField> {
        self.enum_fields.iter().find(|field| field.name == name)
    }
}

/// Typed payload of a synced entity.
pub trait SyncEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn descriptor() -> &'static EntityDescriptor;

    fn entity_type() -> EntityType {
        Self::descriptor().entity_type()
    }

    fn to_payload(&self) -> Result<EntityPayload, String> {
        let value = serde_json::to_value(self).map_err(|e| e.to_string())?;
        EntityPayload::new(value)
    }

    fn from_payload(payload: &EntityPayload) -> Result<Self, String> {
        serde_json::from_value(serde_json::Value::Object(payload.as_map().clone()))
            .map_err(|e| e.to_string())
    }
}

/// Typed view of a local row.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<T> {
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub needs_sync: bool,
}

impl<T: SyncEntity> Entity<T> {
    pub fn from_record(record: &EntityRecord) -> Result<Self, String> {
        Ok(Self {
            id: record.id.clone(),
            tenant_id: record.tenant_id.clone(),
            data: T::from_payload(&record.payload)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_deleted: record.is_deleted,
            needs_sync: record.needs_sync,
        })
    }
}
