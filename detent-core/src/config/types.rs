//! Configuration types
//!
//! Every section has defaults matching the reference board, so a missing
//! section or key in `device.toml` falls back to a working device.

use super::parse::ParseError;

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Active-low input with pull-up, the usual push button wiring
    pub const fn button(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }
}

/// Rotary encoder wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    /// Quadrature channel A
    pub pin_a: PinConfig,
    /// Quadrature channel B
    pub pin_b: PinConfig,
    /// Push button
    pub button: PinConfig,
    /// Raw counts per mechanical detent
    pub counts_per_detent: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            pin_a: PinConfig::with_pullup(10),
            pin_b: PinConfig::with_pullup(11),
            button: PinConfig::button(12),
            counts_per_detent: 4,
        }
    }
}

/// Button gesture thresholds in ms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Presses shorter than this are clicks
    pub click_max_ms: u32,
    /// Presses at least this long are long presses
    pub long_press_ms: u32,
    /// Presses at least this long are ultra-long presses
    pub ultra_long_press_ms: u32,
    /// Maximum gap between two clicks of a double click
    pub double_click_window_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            click_max_ms: 500,
            long_press_ms: 1000,
            ultra_long_press_ms: 3000,
            double_click_window_ms: 500,
        }
    }
}

/// LED and buzzer wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedbackConfig {
    pub led_red: PinConfig,
    pub led_green: PinConfig,
    pub led_blue: PinConfig,
    pub buzzer: PinConfig,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            led_red: PinConfig::new(18),
            led_green: PinConfig::new(19),
            led_blue: PinConfig::new(20),
            buzzer: PinConfig::new(15),
        }
    }
}

/// Coordinator and supervision settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    /// Network association must succeed before the device is ready
    pub network_required: bool,
    /// Boot animation length, measured from process start
    pub boot_duration_ms: u32,
    /// Interval between health checks
    pub health_interval_ms: u32,
    /// Stack margin below which a context is restarted
    pub stack_critical_bytes: u32,
    /// Free memory below which the health report flags low memory
    pub low_memory_bytes: u32,
    /// Render context tick period
    pub render_period_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            network_required: false,
            boot_duration_ms: 4000,
            health_interval_ms: 5000,
            stack_critical_bytes: 512,
            low_memory_bytes: 8192,
            render_period_ms: 33,
        }
    }
}

/// Errors from building or validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The file could not be parsed, with the 1-based line number
    Parse { line: usize, error: ParseError },
    /// Gesture thresholds must be strictly ascending
    ThresholdOrder,
    /// Double-click window must be non-zero
    ZeroDoubleClickWindow,
    /// Counts per detent must be non-zero
    ZeroCountsPerDetent,
    /// Render period must be non-zero
    ZeroRenderPeriod,
    /// Pin number out of range
    PinOutOfRange(u8),
    /// Two roles assigned to the same pin
    PinConflict(u8),
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub encoder: EncoderConfig,
    pub timing: TimingConfig,
    pub feedback: FeedbackConfig,
    pub system: SystemConfig,
}

impl DeviceConfig {
    /// All configured pins, in a fixed order
    pub fn pins(&self) -> [PinConfig; 7] {
        [
            self.encoder.pin_a,
            self.encoder.pin_b,
            self.encoder.button,
            self.feedback.led_red,
            self.feedback.led_green,
            self.feedback.led_blue,
            self.feedback.buzzer,
        ]
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        if !(t.click_max_ms < t.long_press_ms && t.long_press_ms < t.ultra_long_press_ms) {
            return Err(ConfigError::ThresholdOrder);
        }
        if t.double_click_window_ms == 0 {
            return Err(ConfigError::ZeroDoubleClickWindow);
        }
        if self.encoder.counts_per_detent == 0 {
            return Err(ConfigError::ZeroCountsPerDetent);
        }
        if self.system.render_period_ms == 0 {
            return Err(ConfigError::ZeroRenderPeriod);
        }

        let pins = self.pins();
        for (i, pin) in pins.iter().enumerate() {
            if pin.pin > MAX_GPIO {
                return Err(ConfigError::PinOutOfRange(pin.pin));
            }
            if pins[..i].iter().any(|other| other.pin == pin.pin) {
                return Err(ConfigError::PinConflict(pin.pin));
            }
        }

        Ok(())
    }
}
