use crate::domain::value_objects::TenantId;

/// Source of the authenticated business. `None` means no session.
pub trait TenantContext: Send + Sync {
    fn current_tenant_id(&self) -> Option<TenantId>;
}
