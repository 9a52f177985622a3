use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityTransition {
    Online,
    Offline,
}

pub trait ConnectivityMonitor: Send + Sync {
    fn is_currently_connected(&self) -> bool;
    fn subscribe(&self) -> broadcast::Receiver<ConnectivityTransition>;
}
