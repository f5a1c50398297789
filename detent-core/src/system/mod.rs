//! Device lifecycle
//!
//! The coordinator state machine that sequences boot, network association
//! and run, and drives health supervision.

pub mod coordinator;
pub mod network;
pub mod state;

pub use coordinator::{
    Collaborators, CycleReport, SystemCoordinator, Transition, MAX_TRANSITIONS_PER_CYCLE,
};
pub use network::{NetworkState, NetworkWatcher};
pub use state::{FaultKind, SystemState};
