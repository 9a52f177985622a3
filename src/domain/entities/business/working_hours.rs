use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use serde::{Deserialize, Serialize};

remote_enum! {
    Weekday {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
    } default Monday
}

/// Opening hours for one weekday, optionally per employee. Times are `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub weekday: Weekday,
    pub opens_at: String,
    pub closes_at: String,
    #[serde(default)]
    pub is_closed: bool,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    enum_fields: &[EnumField {
        name: "weekday",
        values: Weekday::VALUES,
        default: Weekday::DEFAULT.as_str(),
    }],
    ..EntityDescriptor::new("working_hours", "workingHours")
};

impl SyncEntity for WorkingHours {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
