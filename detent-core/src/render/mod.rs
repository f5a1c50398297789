//! Render/input context
//!
//! The loop body of the fixed-cadence context that owns the encoder and
//! the display.

pub mod context;

pub use context::{RenderContext, TickReport};
