use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

remote_enum! {
    TransactionKind {
        Income => "income",
        Expense => "expense",
    } default Income
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub occurred_at: DateTime<Utc>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    date_field: Some("occurredAt"),
    search_fields: &["description", "category"],
    enum_fields: &[EnumField {
        name: "kind",
        values: TransactionKind::VALUES,
        default: TransactionKind::DEFAULT.as_str(),
    }],
    ..EntityDescriptor::new("transaction", "transactions")
};

impl SyncEntity for Transaction {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
