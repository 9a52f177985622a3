use crate::application::ports::TenantContext;
use crate::domain::entities::EntityRecord;
use crate::domain::value_objects::TenantId;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Resolves the session tenant and rejects any access outside of it.
#[derive(Clone)]
pub struct TenantGuard {
    context: Arc<dyn TenantContext>,
}

impl TenantGuard {
    pub fn new(context: Arc<dyn TenantContext>) -> Self {
        Self { context }
    }

    pub fn require_tenant(&self) -> Result<TenantId, AppError> {
        self.context
            .current_tenant_id()
            .ok_or(AppError::NotAuthenticated)
    }

    /// Confirms that an operation addressed to `requested` runs inside the session.
    pub fn authorize(&self, requested: &TenantId) -> Result<TenantId, AppError> {
        let current = self.require_tenant()?;
        if &current != requested {
            tracing::warn!(
                target: "sync::tenant",
                current = %current,
                requested = %requested,
                "rejected operation scoped to another tenant"
            );
            return Err(AppError::tenant_mismatch(current.as_str(), requested.as_str()));
        }
        Ok(current)
    }

    pub fn ensure_owned(&self, tenant: &TenantId, record: &EntityRecord) -> Result<(), AppError> {
        if &record.tenant_id != tenant {
            tracing::warn!(
                target: "sync::tenant",
                tenant = %tenant,
                owner = %record.tenant_id,
                entity_type = %record.entity_type,
                id = %record.id,
                "rejected access to a record owned by another tenant"
            );
            return Err(AppError::tenant_mismatch(
                tenant.as_str(),
                record.tenant_id.as_str(),
            ));
        }
        Ok(())
    }
}
