use crate::domain::entities::{
    EntityDescriptor, EntityRecord, FIELD_CREATED_AT, FIELD_UPDATED_AT, FieldFallback,
    RemoteDocument, SyncEntity, Translation,
};
use crate::domain::value_objects::{EntityPayload, EntityType, TenantId};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Result of decoding one remote document.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedRecord {
    pub record: EntityRecord,
    pub fallbacks: Vec<FieldFallback>,
}

/// Converts between the local row shape and the remote document shape of one entity type.
pub trait EntityAdapter: Send + Sync {
    fn descriptor(&self) -> &'static EntityDescriptor;

    fn entity_type(&self) -> EntityType {
        self.descriptor().entity_type()
    }

    fn collection(&self) -> &'static str {
        self.descriptor().collection
    }

    fn tenant_field(&self) -> &'static str {
        self.descriptor().tenant_field
    }

    fn to_remote(&self, record: &EntityRecord) -> Result<RemoteDocument, AppError>;

    /// Enum-like fields outside their declared values are replaced by the default and
    /// reported; anything else that does not decode is an error.
    fn from_remote(&self, document: &RemoteDocument) -> Result<TranslatedRecord, AppError>;

    /// Decodes a payload through the typed entity and returns its canonical form.
    fn normalize(&self, payload: &EntityPayload) -> Result<EntityPayload, AppError>;
}

/// Adapter derived from a [`SyncEntity`] and its descriptor.
pub struct TypedAdapter<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T: SyncEntity> TypedAdapter<T> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T: SyncEntity> Default for TypedAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SyncEntity> EntityAdapter for TypedAdapter<T> {
    fn descriptor(&self) -> &'static EntityDescriptor {
        T::descriptor()
    }

    fn to_remote(&self, record: &EntityRecord) -> Result<RemoteDocument, AppError> {
        let descriptor = T::descriptor();
        if record.entity_type.as_str() != descriptor.entity_type {
            return Err(AppError::Internal(format!(
                "{} adapter cannot encode a {} record",
                descriptor.entity_type, record.entity_type
            )));
        }

        let mut fields = self.normalize(&record.payload)?.into_inner();
        fields.insert(
            descriptor.tenant_field.to_string(),
            Value::String(record.tenant_id.as_str().to_string()),
        );
        fields.insert(
            FIELD_CREATED_AT.to_string(),
            Value::from(record.created_at.timestamp_millis()),
        );
        fields.insert(
            FIELD_UPDATED_AT.to_string(),
            Value::from(record.updated_at.timestamp_millis()),
        );

        Ok(RemoteDocument::new(record.id.clone(), fields))
    }

    fn from_remote(&self, document: &RemoteDocument) -> Result<TranslatedRecord, AppError> {
        let descriptor = T::descriptor();
        let raw_tenant = document.str_field(descriptor.tenant_field).ok_or_else(|| {
            AppError::DeserializationError(format!(
                "{} document {} has no {}",
                descriptor.entity_type, document.id, descriptor.tenant_field
            ))
        })?;
        let tenant_id = TenantId::parse(raw_tenant).map_err(AppError::DeserializationError)?;

        let mut fallbacks = Vec::new();
        let created = translate_timestamp(document.field(FIELD_CREATED_AT));
        let updated = translate_timestamp(document.field(FIELD_UPDATED_AT));
        let created_at = created.or(updated).unwrap_or(DateTime::UNIX_EPOCH);
        let updated_at = updated.unwrap_or(created_at);

        let mut fields: Map<String, Value> = document.fields.clone();
        for meta in [descriptor.tenant_field, FIELD_CREATED_AT, FIELD_UPDATED_AT, "id"] {
            fields.remove(meta);
        }

        for enum_field in descriptor.enum_fields {
            let Some(raw) = fields.get(enum_field.name) else {
                continue;
            };
            if let Translation::Fallback { value, raw } =
                translate_enum(enum_field.values, enum_field.default, raw)
            {
                tracing::warn!(
                    target: "sync::adapter",
                    entity_type = descriptor.entity_type,
                    id = %document.id,
                    field = enum_field.name,
                    raw = %raw,
                    default = value,
                    "unknown enum value replaced by default"
                );
                fallbacks.push(FieldFallback {
                    field: enum_field.name.to_string(),
                    raw,
                    default: value.to_string(),
                });
                fields.insert(enum_field.name.to_string(), Value::String(value.to_string()));
            }
        }

        let payload = EntityPayload::new(Value::Object(fields))
            .map_err(AppError::DeserializationError)?;
        let payload = self.normalize(&payload)?;

        Ok(TranslatedRecord {
            record: EntityRecord::from_remote(
                descriptor.entity_type(),
                document.id.clone(),
                tenant_id,
                payload,
                created_at,
                updated_at,
            ),
            fallbacks,
        })
    }

    fn normalize(&self, payload: &EntityPayload) -> Result<EntityPayload, AppError> {
        let typed = T::from_payload(payload).map_err(|e| {
            AppError::DeserializationError(format!("{}: {e}", T::descriptor().entity_type))
        })?;
        typed.to_payload().map_err(AppError::SerializationError)
    }
}

fn translate_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_i64)
        .and_then(DateTime::from_timestamp_millis)
}

fn translate_enum(
    accepted: &[&'static str],
    default: &'static str,
    raw: &Value,
) -> Translation<&'static str> {
    if let Some(text) = raw.as_str()
        && let Some(known) = accepted.iter().find(|candidate| **candidate == text)
    {
        return Translation::Parsed(*known);
    }
    let raw = match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Translation::Fallback {
        value: default,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::business::{Appointment, AppointmentStatus, Customer};
    use crate::domain::value_objects::EntityId;
    use serde_json::json;

    fn document(id: &str, value: Value) -> RemoteDocument {
        let Value::Object(fields) = value else {
            panic!("document fields must be an object");
        };
        RemoteDocument::new(EntityId::parse(id).unwrap(), fields)
    }

    #[test]
    fn to_remote_stamps_tenant_and_timestamps() {
        let adapter = TypedAdapter::<Customer>::new();
        let record = EntityRecord::new_local(
            Customer::entity_type(),
            EntityId::parse("c1").unwrap(),
            TenantId::parse("biz-1").unwrap(),
            Customer::named("Ayşe").to_payload().unwrap(),
        );

        let doc = adapter.to_remote(&record).unwrap();
        assert_eq!(doc.id.as_str(), "c1");
        assert_eq!(doc.str_field("tenantId"), Some("biz-1"));
        assert_eq!(doc.str_field("name"), Some("Ayşe"));
        assert_eq!(
            doc.field("updatedAt").and_then(Value::as_i64),
            Some(record.updated_at.timestamp_millis())
        );
    }

    #[test]
    fn unknown_status_falls_back_to_default() {
        let adapter = TypedAdapter::<Appointment>::new();
        let doc = document(
            "a1",
            json!({
                "tenantId": "biz-1",
                "customerId": "c1",
                "startsAt": 1_700_000_000_000_i64,
                "endsAt": 1_700_000_360_000_i64,
                "status": "teleported",
                "createdAt": 1_700_000_000_000_i64,
                "updatedAt": 1_700_000_100_000_i64,
            }),
        );

        let translated = adapter.from_remote(&doc).unwrap();
        assert_eq!(translated.fallbacks.len(), 1);
        assert_eq!(translated.fallbacks[0].raw, "teleported");
        let appointment = Appointment::from_payload(&translated.record.payload).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::DEFAULT);
        assert!(!translated.record.needs_sync);
        assert_eq!(translated.record.updated_at.timestamp_millis(), 1_700_000_100_000);
    }

    #[test]
    fn missing_tenant_is_rejected() {
        let adapter = TypedAdapter::<Customer>::new();
        let doc = document("c1", json!({ "name": "Ayşe" }));
        assert!(matches!(
            adapter.from_remote(&doc),
            Err(AppError::DeserializationError(_))
        ));
    }

    #[test]
    fn missing_updated_at_uses_created_at() {
        let adapter = TypedAdapter::<Customer>::new();
        let doc = document(
            "c1",
            json!({ "tenantId": "biz-1", "name": "Ayşe", "createdAt": 1_000_i64 }),
        );
        let record = adapter.from_remote(&doc).unwrap().record;
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.updated_at.timestamp_millis(), 1_000);
    }
}
