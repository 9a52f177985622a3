use serde::{Deserialize, Serialize};

/// Outcome of decoding one remote field into a known value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Translation<T> {
    Parsed(T),
    Fallback { value: T, raw: String },
}

impl<T> Translation<T> {
    pub fn value(&self) -> &T {
        match self {
            Translation::Parsed(value) => value,
            Translation::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Translation::Parsed(value) => value,
            Translation::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Translation::Fallback { .. })
    }
}

/// A remote field that was replaced by its declared default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFallback {
    pub field: String,
    pub raw: String,
    pub default: String,
}
