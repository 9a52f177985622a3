use crate::domain::entities::sync_entity::{EntityDescriptor, SyncEntity};
use serde::{Deserialize, Serialize};

/// Something the business sells by appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub duration_minutes: u32,
    pub price: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    search_fields: &["name"],
    ..EntityDescriptor::new("service", "services")
};

impl SyncEntity for Service {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
