pub mod session;

pub use session::SessionTenantContext;
