use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use serde::{Deserialize, Serialize};

remote_enum! {
    EmployeeRole {
        Owner => "owner",
        Manager => "manager",
        Staff => "staff",
    } default Staff
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: EmployeeRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    status_field: Some("role"),
    search_fields: &["name", "phone"],
    enum_fields: &[EnumField {
        name: "role",
        values: EmployeeRole::VALUES,
        default: EmployeeRole::DEFAULT.as_str(),
    }],
    ..EntityDescriptor::new("employee", "employees")
};

impl SyncEntity for Employee {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
