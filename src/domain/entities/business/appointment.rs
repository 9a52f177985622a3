use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

remote_enum! {
    AppointmentStatus {
        Scheduled => "scheduled",
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
        NoShow => "no_show",
    } default Scheduled
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub customer_id: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub starts_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    status_field: Some("status"),
    date_field: Some("startsAt"),
    search_fields: &["notes"],
    enum_fields: &[EnumField {
        name: "status",
        values: AppointmentStatus::VALUES,
        default: AppointmentStatus::DEFAULT.as_str(),
    }],
    ..EntityDescriptor::new("appointment", "appointments")
};

impl SyncEntity for Appointment {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
