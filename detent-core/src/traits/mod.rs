//! Collaborator traits
//!
//! These traits define the interface between the core state machines
//! and the board-specific implementations in the firmware.

pub mod app;
pub mod clock;
pub mod context;
pub mod display;
pub mod encoder;
pub mod feedback;
pub mod network;

pub use app::Application;
pub use clock::Clock;
pub use context::{MonitoredContext, SystemProbe};
pub use display::RenderTarget;
pub use encoder::EncoderHardware;
pub use feedback::{Buzzer, Rgb, StatusLed};
pub use network::{ConfigPortal, NetworkLink};

/// Bundle of the collaborator types driven by the coordinator
///
/// The firmware defines one zero-sized platform type; tests define another
/// with mock collaborators.
pub trait Platform {
    type Clock: Clock;
    type Network: NetworkLink;
    type Portal: ConfigPortal;
    type Led: StatusLed;
    type Buzzer: Buzzer;
    type App: Application;
    type Probe: SystemProbe;
}
