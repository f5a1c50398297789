//! LED and buzzer handles for the coordinator
//!
//! The handles never block. Each call becomes a command for the LED or
//! buzzer task; a full queue drops the command.

use defmt::*;
use embassy_rp::gpio::{Level, Output};

use detent_core::traits::{Buzzer, Rgb, StatusLed};

use crate::channels::{BuzzerCommand, LedCommand, BUZZER_COMMANDS, LED_COMMANDS};

/// Coordinator side of the status LED
#[derive(Debug, Default)]
pub struct LedHandle;

impl LedHandle {
    fn send(&self, command: LedCommand) {
        if LED_COMMANDS.try_send(command).is_err() {
            trace!("LED queue full, dropping {}", command);
        }
    }
}

impl StatusLed for LedHandle {
    fn flash(&mut self, color: Rgb, duration_ms: u16) {
        self.send(LedCommand::Flash(color, duration_ms));
    }

    fn set_loading(&mut self, on: bool) {
        self.send(LedCommand::Loading(on));
    }

    fn activate(&mut self) {
        self.send(LedCommand::Activate);
    }

    fn set_ambient(&mut self, on: bool) {
        self.send(LedCommand::Ambient(on));
    }
}

/// Coordinator side of the buzzer
#[derive(Debug, Default)]
pub struct BuzzerHandle;

impl BuzzerHandle {
    fn send(&self, command: BuzzerCommand) {
        if BUZZER_COMMANDS.try_send(command).is_err() {
            trace!("Buzzer queue full, dropping {}", command);
        }
    }
}

impl Buzzer for BuzzerHandle {
    fn confirm(&mut self) {
        self.send(BuzzerCommand::Confirm);
    }

    fn error(&mut self) {
        self.send(BuzzerCommand::Error);
    }
}

/// Three-pin RGB LED
///
/// Each channel is on or off; components at half brightness or more light it.
pub struct RgbLed {
    red: Output<'static>,
    green: Output<'static>,
    blue: Output<'static>,
    active_low: bool,
}

impl RgbLed {
    pub fn new(
        red: Output<'static>,
        green: Output<'static>,
        blue: Output<'static>,
        active_low: bool,
    ) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            active_low,
        };
        led.show(Rgb::OFF);
        led
    }

    pub fn show(&mut self, color: Rgb) {
        let level = |component: u8| Level::from((component >= 0x80) != self.active_low);
        let (r, g, b) = (level(color.r), level(color.g), level(color.b));
        self.red.set_level(r);
        self.green.set_level(g);
        self.blue.set_level(b);
    }
}
