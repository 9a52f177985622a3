use crate::application::ports::{ConnectivityMonitor, ConnectivityTransition};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

const TRANSITION_CHANNEL_CAPACITY: usize = 16;

/// Connectivity state driven by the host (OS callbacks, tests). Emits only on change.
pub struct ManualConnectivityMonitor {
    connected: AtomicBool,
    transitions: broadcast::Sender<ConnectivityTransition>,
}

impl ManualConnectivityMonitor {
    pub fn new(connected: bool) -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            connected: AtomicBool::new(connected),
            transitions,
        }
    }

    pub fn set_connected(&self, connected: bool) {
        let previous = self.connected.swap(connected, Ordering::SeqCst);
        if previous == connected {
            return;
        }
        let transition = if connected {
            ConnectivityTransition::Online
        } else {
            ConnectivityTransition::Offline
        };
        tracing::info!(target: "sync::connectivity", ?transition, "connectivity changed");
        let _ = self.transitions.send(transition);
    }
}

impl Default for ManualConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityMonitor for ManualConnectivityMonitor {
    fn is_currently_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityTransition> {
        self.transitions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn only_real_transitions_are_emitted() {
        let monitor = ManualConnectivityMonitor::new(false);
        let mut rx = monitor.subscribe();

        monitor.set_connected(false);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        monitor.set_connected(true);
        monitor.set_connected(true);
        assert_eq!(rx.try_recv().unwrap(), ConnectivityTransition::Online);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(monitor.is_currently_connected());
    }
}
