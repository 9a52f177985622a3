pub mod manual;

pub use manual::ManualConnectivityMonitor;
