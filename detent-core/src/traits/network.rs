//! Network association and configuration portal

use crate::system::NetworkState;

/// Network association collaborator
///
/// Association mechanics live behind this trait. The coordinator only
/// observes [`state`](NetworkLink::state) once per cycle and reacts to edges.
pub trait NetworkLink {
    /// Advance the association state machine
    fn update(&mut self);

    /// Start associating with the stored network
    fn begin_association(&mut self);

    /// Give up on association and open the local access point
    fn fallback_to_local_ap(&mut self);

    /// Current association state
    fn state(&self) -> NetworkState;

    /// Check if a client is connected to the local access point
    fn has_local_client(&self) -> bool;

    /// Address of this device on the active network
    fn local_address(&self) -> &str;

    /// Name of the local access point
    fn network_name(&self) -> &str;
}

/// Embedded configuration web server
pub trait ConfigPortal {
    /// Start serving the setup pages
    fn start(&mut self);

    /// Handle pending requests, called every cycle while in AP mode
    fn service(&mut self);
}
