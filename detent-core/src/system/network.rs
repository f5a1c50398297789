//! Network association states and edge detection

/// State reported by the network collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// No stored credentials
    CredentialsNotFound,
    /// Association did not finish in time
    Timeout,
    /// Association failed
    AssociationError,
    /// Local access point is up
    LocalApMode,
}

impl NetworkState {
    pub fn label(&self) -> &'static str {
        match self {
            NetworkState::Disconnected => "disconnected",
            NetworkState::Connecting => "connecting",
            NetworkState::Connected => "connected",
            NetworkState::CredentialsNotFound => "no-credentials",
            NetworkState::Timeout => "timeout",
            NetworkState::AssociationError => "error",
            NetworkState::LocalApMode => "ap-mode",
        }
    }
}

/// Edge detector over the network state and the AP client level
#[derive(Debug, Clone, Default)]
pub struct NetworkWatcher {
    last_state: NetworkState,
    client_connected: bool,
}

impl NetworkWatcher {
    pub const fn new() -> Self {
        Self {
            last_state: NetworkState::Disconnected,
            client_connected: false,
        }
    }

    /// Record the current state, returning it if it differs from the last one
    pub fn observe(&mut self, state: NetworkState) -> Option<NetworkState> {
        if state == self.last_state {
            return None;
        }
        self.last_state = state;
        if state != NetworkState::LocalApMode {
            self.client_connected = false;
        }
        Some(state)
    }

    /// Record the AP client level, returning `true` on a rising edge
    pub fn observe_client(&mut self, connected: bool) -> bool {
        let rising = connected && !self.client_connected;
        self.client_connected = connected;
        rising
    }

    pub fn last_state(&self) -> NetworkState {
        self.last_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_edges() {
        let mut watcher = NetworkWatcher::new();
        assert_eq!(watcher.observe(NetworkState::Disconnected), None);
        assert_eq!(watcher.observe(NetworkState::Connecting), Some(NetworkState::Connecting));
        assert_eq!(watcher.observe(NetworkState::Connecting), None);
        assert_eq!(watcher.observe(NetworkState::Timeout), Some(NetworkState::Timeout));
        assert_eq!(watcher.last_state(), NetworkState::Timeout);
    }

    #[test]
    fn test_client_edges() {
        let mut watcher = NetworkWatcher::new();
        watcher.observe(NetworkState::LocalApMode);
        assert!(watcher.observe_client(true));
        assert!(!watcher.observe_client(true));
        assert!(!watcher.observe_client(false));
        assert!(watcher.observe_client(true));
    }

    #[test]
    fn test_client_latch_reset_outside_ap() {
        let mut watcher = NetworkWatcher::new();
        watcher.observe(NetworkState::LocalApMode);
        assert!(watcher.observe_client(true));

        watcher.observe(NetworkState::Connecting);
        watcher.observe(NetworkState::LocalApMode);
        assert!(watcher.observe_client(true));
    }
}
