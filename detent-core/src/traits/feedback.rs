//! LED and buzzer feedback

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Status LED animations
///
/// Calls are fire-and-forget. The implementation owns the animation timing.
pub trait StatusLed {
    /// Flash a color for roughly `duration_ms`
    fn flash(&mut self, color: Rgb, duration_ms: u16);

    /// Turn the loading animation on or off
    fn set_loading(&mut self, on: bool);

    /// Pulse to acknowledge activity
    fn activate(&mut self);

    /// Turn the idle ambient animation on or off
    fn set_ambient(&mut self, on: bool);
}

/// Audible feedback
pub trait Buzzer {
    /// Short confirmation chirp
    fn confirm(&mut self);

    /// Error pattern
    fn error(&mut self);
}
