use crate::domain::entities::sync_entity::{EntityDescriptor, EnumField, SyncEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

remote_enum! {
    ExpenseCategory {
        Rent => "rent",
        Supplies => "supplies",
        Salary => "salary",
        Utilities => "utilities",
        Other => "other",
    } default Other
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub spent_at: DateTime<Utc>,
}

static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    status_field: Some("category"),
    date_field: Some("spentAt"),
    search_fields: &["description"],
    enum_fields: &[EnumField {
        name: "category",
        values: ExpenseCategory::VALUES,
        default: ExpenseCategory::DEFAULT.as_str(),
    }],
    ..EntityDescriptor::new("expense", "expenses")
};

impl SyncEntity for Expense {
    fn descriptor() -> &'static EntityDescriptor {
        &DESCRIPTOR
    }
}
