use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use serde::{Deserialize, Serialize};

remote_enum! {
    CustomerStatus {
        Active => "active",
        Inactive => "inactive",
        Blocked => "blocked",
    } default Active
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: CustomerStatus,
}

impl Customer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            email: None,
            notes: None,
            status: CustomerStatus::Active,
        }
    }
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    status_field: Some("status"),
    search_fields: &["name", "phone", "email"],
    enum_fields: &[EnumField {
        name: "status",
        values: CustomerStatus::VALUES,
        default: CustomerStatus::DEFAULT.as_str(),
    }],
    ..EntityDescriptor::new("customer", "customers")
};

impl SyncEntity for Customer {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
