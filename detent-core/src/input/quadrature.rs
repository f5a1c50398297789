//! Quadrature decoder
//!
//! Full x4 decoding: every valid Gray-code transition of the A/B lines moves
//! the count by one, so one mechanical detent of a typical encoder is four
//! counts.
//!
//! Clockwise, A leads B:
//! ```text
//! (A,B): 00 -> 10 -> 11 -> 01 -> 00
//! ```
//! A transition where both lines change at once has no defined direction.
//! It is dropped and counted as noise, and decoding resynchronises on the
//! new levels.

/// Step for each `(previous << 2) | current` line state
///
/// Line state is `(a << 1) | b`. `None` marks a jump across the cycle.
const TRANSITIONS: [Option<i8>; 16] = [
    // from 00
    Some(0),
    Some(-1),
    Some(1),
    None,
    // from 01
    Some(1),
    Some(0),
    None,
    Some(-1),
    // from 10
    Some(-1),
    None,
    Some(0),
    Some(1),
    // from 11
    None,
    Some(1),
    Some(-1),
    Some(0),
];

/// Gray-code quadrature decoder with noise rejection
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    state: u8,
    count: i32,
    noise: u32,
}

impl QuadratureDecoder {
    /// Create a decoder starting from the current line levels
    pub const fn new(a: bool, b: bool) -> Self {
        Self {
            state: line_state(a, b),
            count: 0,
            noise: 0,
        }
    }

    /// Feed one sample of both lines
    ///
    /// Returns the step taken: -1, 0 or +1.
    pub fn sample(&mut self, a: bool, b: bool) -> i8 {
        let next = line_state(a, b);
        let index = usize::from((self.state << 2) | next);
        self.state = next;

        match TRANSITIONS[index] {
            Some(step) => {
                self.count = self.count.wrapping_add(i32::from(step));
                step
            }
            None => {
                self.noise = self.noise.saturating_add(1);
                0
            }
        }
    }

    /// Accumulated raw count
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Number of rejected transitions
    pub fn noise(&self) -> u32 {
        self.noise
    }
}

const fn line_state(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | (b as u8)
}
