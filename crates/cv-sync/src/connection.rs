//! Online/offline tracking for outbound store calls.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use cv_core::NetworkControl;
use tracing::{info, warn};

/// Connectivity events raised by the host platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkEvent {
    Online,
    Offline,
}

/// Point-in-time view of the monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Whether remote calls are currently skipped.
    pub offline: bool,
    /// Failed remote attempts since the last success.
    pub consecutive_failures: u32,
    /// Backoff waits performed since the monitor was created.
    pub retries: u32,
}

/// Decides whether remote calls should be attempted and flips the store's network switch.
pub struct ConnectionMonitor {
    network: Arc<dyn NetworkControl>,
    offline: AtomicBool,
    consecutive_failures: AtomicU32,
    retries: AtomicU32,
}

impl ConnectionMonitor {
    /// Create a monitor in the online state.
    pub fn new(network: Arc<dyn NetworkControl>) -> Self {
        Self {
            network,
            offline: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
            retries: AtomicU32::new(0),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState {
            offline: self.is_offline(),
            consecutive_failures: self.consecutive_failures.load(Ordering::SeqCst),
            retries: self.retries.load(Ordering::SeqCst),
        }
    }

    /// Switch to offline mode and disable the store's network layer.
    ///
    /// Idempotent: only the first call after going online touches the network switch.
    /// A failing switch is logged; the mode change still sticks.
    pub async fn go_offline(&self) {
        if self.offline.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!("connection: switching to offline mode");
        if let Err(err) = self.network.disable_network().await {
            warn!(error = %err, "connection: failed to disable store network");
        }
    }

    /// Switch back to online mode and re-enable the store's network layer.
    pub async fn go_online(&self) {
        if !self.offline.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("connection: back online");
        if let Err(err) = self.network.enable_network().await {
            warn!(error = %err, "connection: failed to enable store network");
        }
    }

    /// React to a platform connectivity event.
    pub async fn handle_event(&self, event: NetworkEvent) {
        match event {
            NetworkEvent::Online => self.go_online().await,
            NetworkEvent::Offline => self.go_offline().await,
        }
    }

    pub(crate) fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    pub(crate) fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for ConnectionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMonitor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
