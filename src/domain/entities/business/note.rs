use crate::domain::entities::sync_entity::{EntityDescriptor, SyncEntity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub pinned: bool,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    search_fields: &["title", "body"],
    ..EntityDescriptor::new("note", "notes")
};

impl SyncEntity for Note {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
