//! Device states

/// Device lifecycle states
///
/// ```text
/// Booting -> Initializing -> Ready -> Running
///                 |            ^
///                 v            |
///          WifiConnecting -----+
///                 |            |
///                 v            |
///            WifiApMode -------+
/// ```
/// `Error` is reachable from any state and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemState {
    /// Boot animation playing
    Booting,
    /// Boot finished, deciding how to reach Ready
    Initializing,
    /// Associating with the configured network
    WifiConnecting,
    /// Serving the local access point for setup
    WifiApMode,
    /// Startup complete, advancing to Running
    Ready,
    /// Normal operation
    Running,
    /// Unrecoverable startup failure
    Error(FaultKind),
}

/// Causes of the terminal error state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// A supervised context did not start
    ContextStalled,
    /// Network required but no network collaborator present
    NetworkUnavailable,
    /// Embedded device configuration rejected, running on defaults
    ConfigError,
}

impl SystemState {
    /// Check if this is the error state
    pub fn is_error(&self) -> bool {
        matches!(self, SystemState::Error(_))
    }

    /// Short label for console output
    pub fn label(&self) -> &'static str {
        match self {
            SystemState::Booting => "booting",
            SystemState::Initializing => "initializing",
            SystemState::WifiConnecting => "wifi-connecting",
            SystemState::WifiApMode => "wifi-ap-mode",
            SystemState::Ready => "ready",
            SystemState::Running => "running",
            SystemState::Error(_) => "error",
        }
    }
}
