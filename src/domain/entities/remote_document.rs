use crate::domain::value_objects::{EntityId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FIELD_TENANT_ID: &str = "tenantId";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_UPDATED_AT: &str = "updatedAt";

/// A document as stored in the remote collection, keyed by entity id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteDocument {
    pub id: EntityId,
    pub fields: Map<String, Value>,
}

impl RemoteDocument {
    pub fn new(id: EntityId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Equality filter on a collection's tenant field. Queries cannot be built without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantFilter {
    field: String,
    tenant_id: TenantId,
}

impl TenantFilter {
    pub fn new(field: impl Into<String>, tenant_id: TenantId) -> Self {
        Self {
            field: field.into(),
            tenant_id,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn matches(&self, document: &RemoteDocument) -> bool {
        document.str_field(&self.field) == Some(self.tenant_id.as_str())
    }
}
