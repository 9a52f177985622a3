use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No connectivity: {0}")]
    NoConnectivity(String),

    #[error("Remote rejected: {0}")]
    RemoteRejected(String),

    #[error("Remote call timed out: {0}")]
    Timeout(String),

    #[error("Tenant mismatch: expected {expected}, found {found}")]
    TenantMismatch { expected: String, found: String },

    #[error("Translation fallback on field {field}: {raw}")]
    TranslationFallback { field: String, raw: String },

    #[error("Not authenticated: no tenant in the current session")]
    NotAuthenticated,

    #[error("Sync cancelled: {0}")]
    Cancelled(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn tenant_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        AppError::TenantMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Failures that leave records dirty and are picked up again by the next trigger.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NoConnectivity(_)
                | AppError::RemoteRejected(_)
                | AppError::Timeout(_)
                | AppError::Cancelled(_)
        )
    }

    /// Aborts the current push/pull step as a whole rather than a single record.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::NoConnectivity(_))
    }

    pub fn is_isolation_violation(&self) -> bool {
        matches!(
            self,
            AppError::TenantMismatch { .. } | AppError::NotAuthenticated
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            AppError::DeserializationError(err.to_string())
        } else {
            AppError::SerializationError(err.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
