//! Raw encoder hardware

/// Raw rotary encoder signals
///
/// Reads take `&mut self` because a hardware read may need to latch a
/// counter or access a peripheral register.
pub trait EncoderHardware {
    /// Absolute raw count, in sub-detent steps
    fn position(&mut self) -> i32;

    /// Current button level, `true` when held down
    ///
    /// Polarity inversion is resolved by the implementation.
    fn button_pressed(&mut self) -> bool;
}
