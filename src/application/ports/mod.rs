pub mod connectivity;
pub mod local_store;
pub mod remote_store;
pub mod tenant_context;
pub mod write_listener;

pub use connectivity::{ConnectivityMonitor, ConnectivityTransition};
pub use local_store::{DateRange, FieldMatch, LocalStore, RecordQuery, TextSearch};
pub use remote_store::RemoteStore;
pub use tenant_context::TenantContext;
pub use write_listener::LocalWriteListener;
