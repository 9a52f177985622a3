use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

remote_enum! {
    PaymentMethod {
        Cash => "cash",
        Card => "card",
        Transfer => "transfer",
        Other => "other",
    } default Cash
}

remote_enum! {
    PaymentStatus {
        Pending => "pending",
        Completed => "completed",
        Refunded => "refunded",
    } default Pending
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub customer_id: String,
    #[serde(default)]
    pub appointment_id: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub paid_at: DateTime<Utc>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    status_field: Some("status"),
    date_field: Some("paidAt"),
    enum_fields: &[
        EnumField {
            name: "method",
            values: PaymentMethod::VALUES,
            default: PaymentMethod::DEFAULT.as_str(),
        },
        EnumField {
            name: "status",
            values: PaymentStatus::VALUES,
            default: PaymentStatus::DEFAULT.as_str(),
        },
    ],
    immutable_fields: &["customerId"],
    ..EntityDescriptor::new("payment", "payments")
};

impl SyncEntity for Payment {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
