//! Encoder hardware for the render context
//!
//! The quadrature task decodes the A/B lines at 1 kHz and publishes the raw
//! count. The render context reads that count and samples the button line
//! itself on every tick.

use embassy_rp::gpio::Input;
use portable_atomic::{AtomicI32, Ordering};

use detent_core::config::PinConfig;
use detent_core::traits::EncoderHardware;

/// Raw sub-detent count written by the quadrature task
pub static ENCODER_POSITION: AtomicI32 = AtomicI32::new(0);

/// Read one input line, resolving the configured polarity
pub fn read_level(input: &Input<'static>, config: PinConfig) -> bool {
    input.is_high() != config.inverted
}

/// GPIO-backed [`EncoderHardware`]
pub struct GpioEncoder {
    position: &'static AtomicI32,
    button: Input<'static>,
    button_config: PinConfig,
}

impl GpioEncoder {
    pub fn new(position: &'static AtomicI32, button: Input<'static>, button_config: PinConfig) -> Self {
        Self {
            position,
            button,
            button_config,
        }
    }
}

impl EncoderHardware for GpioEncoder {
    fn position(&mut self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    fn button_pressed(&mut self) -> bool {
        read_level(&self.button, self.button_config)
    }
}
