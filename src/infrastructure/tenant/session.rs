use crate::application::ports::TenantContext;
use crate::domain::value_objects::TenantId;
use std::sync::RwLock;

/// Tenant of the signed-in business; cleared on sign-out.
#[derive(Default)]
pub struct SessionTenantContext {
    current: RwLock<Option<TenantId>>,
}

impl SessionTenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(tenant: TenantId) -> Self {
        Self {
            current: RwLock::new(Some(tenant)),
        }
    }

    pub fn sign_in(&self, tenant: TenantId) {
        tracing::info!(target: "sync::tenant", tenant = %tenant, "session started");
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(tenant);
    }

    pub fn sign_out(&self) {
        tracing::info!(target: "sync::tenant", "session ended");
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl TenantContext for SessionTenantContext {
    fn current_tenant_id(&self) -> Option<TenantId> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
