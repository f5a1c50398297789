//! Buzzer task
//!
//! Drives a passive buzzer by toggling its pin in software.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Timer;

use crate::channels::{BuzzerCommand, BUZZER_COMMANDS};
use crate::contexts::task_started;

/// A tone as (frequency in Hz, duration in ms)
type Tone = (u32, u32);

const CONFIRM: &[Tone] = &[(2700, 40)];

const ERROR: &[Tone] = &[(400, 120), (0, 60), (400, 120)];

#[embassy_executor::task]
pub async fn buzzer_task(mut pin: Output<'static>) {
    info!("Buzzer task started");
    task_started();

    loop {
        let command = BUZZER_COMMANDS.receive().await;
        trace!("Buzzer: {}", command);
        let pattern = match command {
            BuzzerCommand::Confirm => CONFIRM,
            BuzzerCommand::Error => ERROR,
        };
        for &tone in pattern {
            play(&mut pin, tone).await;
        }
        pin.set_low();
    }
}

/// Play one tone; frequency 0 is a rest
async fn play(pin: &mut Output<'static>, (frequency_hz, duration_ms): Tone) {
    if frequency_hz == 0 {
        Timer::after_millis(u64::from(duration_ms)).await;
        return;
    }
    let half_period_us = u64::from(500_000 / frequency_hz);
    let cycles = duration_ms * frequency_hz / 1000;
    for _ in 0..cycles {
        pin.set_high();
        Timer::after_micros(half_period_us).await;
        pin.set_low();
        Timer::after_micros(half_period_us).await;
    }
}
