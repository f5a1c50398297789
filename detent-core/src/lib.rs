//! Board-agnostic runtime core for the Detent rotary knob controller
//!
//! This crate contains all logic that does not depend on a specific
//! board or HAL:
//!
//! - Event types exchanged between the two execution contexts
//! - The duplex event channel that is the only path between them
//! - Encoder input: quadrature decoding and gesture classification
//! - The render/input context loop body
//! - The system coordinator state machine and event dispatch
//! - Health supervision of the worker contexts
//! - Console command parsing
//! - Configuration types and the device.toml parser
//! - Collaborator traits (network, LED, buzzer, display, application)

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod console;
pub mod event;
pub mod health;
pub mod input;
pub mod render;
pub mod system;
pub mod traits;

pub use channel::{ChannelStatus, EventChannel};
pub use event::{Event, EventKind, Text};
