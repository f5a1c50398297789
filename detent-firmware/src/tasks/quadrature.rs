//! Quadrature sampling task
//!
//! Samples both encoder lines every millisecond and publishes the decoded
//! sub-detent count for the render context.

use defmt::*;
use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;
use embassy_time::{Duration, Ticker};
use portable_atomic::{AtomicI32, Ordering};

use detent_core::config::EncoderConfig;
use detent_core::input::QuadratureDecoder;

use crate::contexts::task_started;
use crate::encoder::read_level;
use crate::pins;

/// Sampling interval in microseconds
const SAMPLE_INTERVAL_US: u64 = 1000;

/// Log the noise counter every this many samples
const NOISE_REPORT_SAMPLES: u32 = 10_000;

#[embassy_executor::task]
pub async fn quadrature_task(
    a: Peri<'static, AnyPin>,
    b: Peri<'static, AnyPin>,
    config: EncoderConfig,
    position: &'static AtomicI32,
) {
    info!("Quadrature task started");
    task_started();

    let a = pins::input(a, config.pin_a);
    let b = pins::input(b, config.pin_b);
    let mut decoder = QuadratureDecoder::new(read_level(&a, config.pin_a), read_level(&b, config.pin_b));
    let mut ticker = Ticker::every(Duration::from_micros(SAMPLE_INTERVAL_US));
    let mut samples: u32 = 0;
    let mut reported_noise = 0;

    loop {
        ticker.next().await;

        if decoder.sample(read_level(&a, config.pin_a), read_level(&b, config.pin_b)) != 0 {
            position.store(decoder.count(), Ordering::Relaxed);
        }

        samples = samples.wrapping_add(1);
        if samples % NOISE_REPORT_SAMPLES == 0 && decoder.noise() != reported_noise {
            reported_noise = decoder.noise();
            warn!("Quadrature: {} invalid transitions so far", reported_noise);
        }
    }
}
