//! Render/input task
//!
//! Runs the render context at the configured cadence on core 1. A restart
//! requested by the health check drops the local gesture and display state
//! at the start of the next tick.

use defmt::*;
use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;
use embassy_time::{Duration, Ticker};

use detent_core::config::{EncoderConfig, TimingConfig};
use detent_core::input::EncoderInput;
use detent_core::render::RenderContext;

use crate::board::UptimeClock;
use crate::channels::DeviceChannel;
use crate::contexts::{task_started, RENDER_MONITOR};
use crate::display::TraceDisplay;
use crate::encoder::{GpioEncoder, ENCODER_POSITION};
use crate::pins;

#[embassy_executor::task]
pub async fn render_task(
    channel: &'static DeviceChannel,
    button: Peri<'static, AnyPin>,
    encoder: EncoderConfig,
    timing: TimingConfig,
    period_ms: u32,
) {
    info!("Render task started ({} ms period)", period_ms);
    task_started();

    let hardware = GpioEncoder::new(&ENCODER_POSITION, pins::input(button, encoder.button), encoder.button);
    let input = EncoderInput::new(hardware, UptimeClock, timing, encoder.counts_per_detent);
    let mut context = RenderContext::new(channel, input, TraceDisplay::new());

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(period_ms)));
    RENDER_MONITOR.set_running();

    loop {
        ticker.next().await;

        if RENDER_MONITOR.take_restart() {
            warn!("Render context restarting (restart #{})", RENDER_MONITOR.restarts());
            context.reset();
        }

        let report = context.tick();
        if report.long_press_reached {
            debug!("Hold passed the long-press threshold");
        }
        if report.rejected > 0 {
            warn!("Coordination queue full, dropped {} events", report.rejected);
        }
        if report.sent > 0 || report.shown > 0 {
            trace!("Render tick: {}", report);
        }
    }
}
