//! Typed payloads for the business records the app keeps in sync.

/// Declares an enum-like field whose raw string values travel to the remote store.
macro_rules! remote_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $raw:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $raw)] $variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($raw),+];
            pub const DEFAULT: Self = $name::$default;

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $raw),+
                }
            }

            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($raw => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod appointment;
pub mod customer;
pub mod employee;
pub mod expense;
pub mod note;
pub mod payment;
pub mod service;
pub mod transaction;
pub mod working_hours;

pub use appointment::{Appointment, AppointmentStatus};
pub use customer::{Customer, CustomerStatus};
pub use employee::{Employee, EmployeeRole};
pub use expense::{Expense, ExpenseCategory};
pub use note::Note;
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use service::Service;
pub use transaction::{Transaction, TransactionKind};
pub use working_hours::{Weekday, WorkingHours};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SyncEntity;

    #[test]
    fn enum_defaults_are_declared_values() {
        for descriptor in [
            Appointment::descriptor(),
            Customer::descriptor(),
            Employee::descriptor(),
            Expense::descriptor(),
            Payment::descriptor(),
            Transaction::descriptor(),
            WorkingHours::descriptor(),
        ] {
            for field in descriptor.enum_fields {
                assert!(
                    field.accepts(field.default),
                    "{}.{} default is not an accepted value",
                    descriptor.entity_type,
                    field.name
                );
            }
        }
    }

    #[test]
    fn remote_enum_round_trips_raw_values() {
        assert_eq!(AppointmentStatus::parse("no_show"), Some(AppointmentStatus::NoShow));
        assert_eq!(AppointmentStatus::NoShow.as_str(), "no_show");
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
        assert_eq!(
            serde_json::to_value(ExpenseCategory::Rent).unwrap(),
            serde_json::json!("rent")
        );
    }
}
