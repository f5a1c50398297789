//! Runtime GPIO allocation
//!
//! Pins come from `device.toml` by number, so they are handed out at runtime
//! from a bank holding every free RP2040 GPIO. Each pin can be taken once.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;

use detent_core::config::{ConfigError, DeviceConfig, PinConfig, MAX_GPIO};

/// Number of GPIO pins on the RP2040
pub const GPIO_COUNT: usize = MAX_GPIO as usize + 1;

/// First GPIO not reserved for the console UART
pub const FIRST_FREE_GPIO: u8 = 2;

/// Pins available for allocation
pub const FREE_GPIO_COUNT: usize = GPIO_COUNT - FIRST_FREE_GPIO as usize;

/// GPIO allocation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum PinError {
    /// Pin belongs to the console UART
    Reserved(u8),
    /// Pin number does not exist
    OutOfRange(u8),
    /// Pin was already taken
    InUse(u8),
}

/// Errors while preparing the device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum SetupError {
    Config(ConfigError),
    Pin(PinError),
}

impl From<ConfigError> for SetupError {
    fn from(e: ConfigError) -> Self {
        SetupError::Config(e)
    }
}

impl From<PinError> for SetupError {
    fn from(e: PinError) -> Self {
        SetupError::Pin(e)
    }
}

/// Check a pin number against the board without taking it
pub fn check_pin(pin: u8) -> Result<(), PinError> {
    if pin < FIRST_FREE_GPIO {
        Err(PinError::Reserved(pin))
    } else if pin > MAX_GPIO {
        Err(PinError::OutOfRange(pin))
    } else {
        Ok(())
    }
}

/// Check every configured pin against the board
pub fn check_config(config: &DeviceConfig) -> Result<(), PinError> {
    config.pins().iter().try_for_each(|pin| check_pin(pin.pin))
}

/// Free GPIO pins, indexed by number
pub struct PinBank {
    slots: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Create a bank from GPIO 2..=29, in order
    pub fn new(pins: [Peri<'static, AnyPin>; FREE_GPIO_COUNT]) -> Self {
        let mut slots: [Option<Peri<'static, AnyPin>>; GPIO_COUNT] = core::array::from_fn(|_| None);
        for (slot, pin) in slots[FIRST_FREE_GPIO as usize..].iter_mut().zip(pins) {
            *slot = Some(pin);
        }
        Self { slots }
    }

    /// Take a pin out of the bank
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        check_pin(pin)?;
        self.slots
            .get_mut(pin as usize)
            .ok_or(PinError::OutOfRange(pin))?
            .take()
            .ok_or(PinError::InUse(pin))
    }
}

/// Digital input honoring the configured pull-up
pub fn input(pin: Peri<'static, AnyPin>, config: PinConfig) -> Input<'static> {
    let pull = if config.pull_up { Pull::Up } else { Pull::None };
    Input::new(pin, pull)
}

/// Digital output starting in its inactive level
pub fn output(pin: Peri<'static, AnyPin>, config: PinConfig) -> Output<'static> {
    let level = if config.inverted { Level::High } else { Level::Low };
    Output::new(pin, level)
}

/// Pins for the render context on core 1
pub struct EncoderPins {
    pub a: Peri<'static, AnyPin>,
    pub b: Peri<'static, AnyPin>,
    pub button: Peri<'static, AnyPin>,
}

/// Pins for the feedback tasks on core 0
pub struct FeedbackPins {
    pub red: Peri<'static, AnyPin>,
    pub green: Peri<'static, AnyPin>,
    pub blue: Peri<'static, AnyPin>,
    pub buzzer: Peri<'static, AnyPin>,
}

/// Take every configured pin from the bank
pub fn allocate(
    bank: &mut PinBank,
    config: &DeviceConfig,
) -> Result<(EncoderPins, FeedbackPins), PinError> {
    let encoder = EncoderPins {
        a: bank.take(config.encoder.pin_a.pin)?,
        b: bank.take(config.encoder.pin_b.pin)?,
        button: bank.take(config.encoder.button.pin)?,
    };
    let feedback = FeedbackPins {
        red: bank.take(config.feedback.led_red.pin)?,
        green: bank.take(config.feedback.led_green.pin)?,
        blue: bank.take(config.feedback.led_blue.pin)?,
        buzzer: bank.take(config.feedback.buzzer.pin)?,
    };
    Ok((encoder, feedback))
}
