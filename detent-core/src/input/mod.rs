//! Encoder input
//!
//! Quadrature decoding of the A/B lines and gesture classification of
//! rotation plus the push button.

pub mod encoder;
pub mod quadrature;

pub use encoder::{EncoderInput, GesturePhase};
pub use quadrature::QuadratureDecoder;
