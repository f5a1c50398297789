//! Status LED task
//!
//! Plays the animations requested by the coordinator. A flash runs to
//! completion; loading and ambient are background animations that resume
//! after it.

use defmt::*;
use embassy_time::{with_timeout, Duration, Timer};

use detent_core::traits::Rgb;

use crate::channels::{LedCommand, LED_COMMANDS};
use crate::contexts::{task_started, LED_MONITOR};
use crate::feedback::RgbLed;

/// Background animation step
const ANIMATION_STEP_MS: u64 = 125;

/// Loading blink toggles every this many steps
const LOADING_STEPS: u32 = 2;

/// Ambient blip period in steps
const AMBIENT_PERIOD_STEPS: u32 = 24;

/// Activity pulse length
const ACTIVATE_MS: u64 = 40;

/// Ambient and activity color
const DIM_WHITE: Rgb = Rgb::new(0x80, 0x80, 0x80);

#[embassy_executor::task]
pub async fn led_task(mut led: RgbLed) {
    info!("LED task started");
    task_started();

    let mut loading = false;
    let mut ambient = false;
    let mut step: u32 = 0;
    LED_MONITOR.set_running();

    loop {
        if LED_MONITOR.take_restart() {
            warn!("LED task restarting (restart #{})", LED_MONITOR.restarts());
            loading = false;
            ambient = false;
            step = 0;
            led.show(Rgb::OFF);
        }

        match with_timeout(Duration::from_millis(ANIMATION_STEP_MS), LED_COMMANDS.receive()).await {
            Ok(LedCommand::Flash(color, duration_ms)) => {
                trace!("LED flash {} for {} ms", color, duration_ms);
                led.show(color);
                Timer::after_millis(u64::from(duration_ms)).await;
                led.show(Rgb::OFF);
            }
            Ok(LedCommand::Activate) => {
                led.show(DIM_WHITE);
                Timer::after_millis(ACTIVATE_MS).await;
                led.show(Rgb::OFF);
            }
            Ok(LedCommand::Loading(on)) => {
                loading = on;
                if !on {
                    led.show(Rgb::OFF);
                }
            }
            Ok(LedCommand::Ambient(on)) => {
                ambient = on;
                if !on {
                    led.show(Rgb::OFF);
                }
            }
            Err(_) => {
                step = step.wrapping_add(1);
                if loading {
                    let lit = (step / LOADING_STEPS) % 2 == 0;
                    led.show(if lit { Rgb::BLUE } else { Rgb::OFF });
                } else if ambient {
                    let lit = step % AMBIENT_PERIOD_STEPS == 0;
                    led.show(if lit { DIM_WHITE } else { Rgb::OFF });
                }
            }
        }
    }
}
