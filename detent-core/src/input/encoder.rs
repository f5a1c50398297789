//! Encoder gesture state machine
//!
//! Turns the raw count and the button level into consumable gestures.
//! Every `consume_*` query returns a pending gesture once and clears it.
//!
//! Button classification by press duration, with `T1 < T2 < T3` from
//! [`TimingConfig`]:
//!
//! | Duration    | Gesture                                   |
//! |-------------|-------------------------------------------|
//! | `< T1`      | click, or double click with a prior click |
//! | `T1 .. T2`  | nothing                                   |
//! | `T2 .. T3`  | long press, on release                    |
//! | `>= T3`     | ultra-long press, fired while still held  |
//!
//! Rotating while the button is held turns the press into press-and-rotate.
//! That hold then reports no click, long or ultra-long press.

use crate::config::TimingConfig;
use crate::traits::{Clock, EncoderHardware};

/// Informal node of the gesture state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GesturePhase {
    /// Button released, nothing outstanding
    Idle,
    /// Button held, no rotation yet
    Pressed,
    /// First click seen, waiting for the double-click window to close
    WaitingSecondClick,
    /// Rotation while held, until release
    PressAndRotate,
}

/// Gestures waiting to be consumed
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    click: bool,
    double_click: bool,
    long_press: bool,
    ultra_long_press: bool,
    press_and_rotate: bool,
    movement: bool,
}

/// Latches that live for one press
#[derive(Debug, Clone, Copy, Default)]
struct PressLatches {
    /// Held past the long-press floor
    long_reached: bool,
    /// Ultra-long press already raised for this hold
    ultra_notified: bool,
    /// Rotation seen during this hold
    press_and_rotate: bool,
}

/// Rotary encoder with push button
pub struct EncoderInput<H: EncoderHardware, C: Clock> {
    hardware: H,
    clock: C,
    timing: TimingConfig,
    counts_per_detent: i32,

    last_detent: i32,
    movement: i32,
    button_down: bool,
    press_start: u32,
    last_press_duration: u32,
    /// Time of the first click while waiting for a second one
    first_click_at: Option<u32>,

    pending: Pending,
    press: PressLatches,
}

impl<H: EncoderHardware, C: Clock> EncoderInput<H, C> {
    /// Create the state machine and take the current count as baseline
    ///
    /// A zero `counts_per_detent` is treated as one.
    pub fn new(mut hardware: H, clock: C, timing: TimingConfig, counts_per_detent: u8) -> Self {
        let counts_per_detent = i32::from(counts_per_detent.max(1));
        let last_detent = hardware.position().div_euclid(counts_per_detent);
        Self {
            hardware,
            clock,
            timing,
            counts_per_detent,
            last_detent,
            movement: 0,
            button_down: false,
            press_start: 0,
            last_press_duration: 0,
            first_click_at: None,
            pending: Pending::default(),
            press: PressLatches::default(),
        }
    }

    /// Sample rotation and button once
    ///
    /// Call at 50 Hz or faster so no full press/release cycle falls between
    /// two samples. A button already held at the first sample after
    /// [`new`](Self::new) or [`reset`](Self::reset) counts as a fresh press.
    pub fn update(&mut self) {
        let now = self.clock.now_ms();
        let pressed = self.hardware.button_pressed();
        let position = self.hardware.position();

        self.process_button_edge(now, pressed);
        self.process_rotation(position);
        self.process_hold(now);
        self.process_double_click_timeout(now);
    }

    fn process_button_edge(&mut self, now: u32, pressed: bool) {
        if pressed == self.button_down {
            return;
        }
        self.button_down = pressed;

        if pressed {
            self.press_start = now;
            self.press = PressLatches::default();
            return;
        }

        let duration = now.wrapping_sub(self.press_start);
        self.last_press_duration = duration;

        if self.press.press_and_rotate {
            // The gesture already fired; leftover steps belong to it
            self.press.press_and_rotate = false;
            self.movement = 0;
            self.pending.movement = false;
            return;
        }

        if duration >= self.timing.ultra_long_press_ms {
            if !self.press.ultra_notified {
                self.pending.ultra_long_press = true;
                self.press.ultra_notified = true;
            }
        } else if duration >= self.timing.long_press_ms {
            self.pending.long_press = true;
        } else if duration < self.timing.click_max_ms {
            self.register_click(now);
            return;
        }

        // Not a click: an outstanding first click stands on its own
        if self.first_click_at.take().is_some() {
            self.confirm_click();
        }
    }

    /// Report a single click unless a double click is still unconsumed
    fn confirm_click(&mut self) {
        if !self.pending.double_click {
            self.pending.click = true;
        }
    }

    fn register_click(&mut self, now: u32) {
        if self.first_click_at.take().is_some() {
            self.pending.double_click = true;
            self.pending.click = false;
        } else {
            self.first_click_at = Some(now);
        }
    }

    fn process_rotation(&mut self, position: i32) {
        let detent = position.div_euclid(self.counts_per_detent);
        let delta = detent.wrapping_sub(self.last_detent);
        if delta == 0 {
            return;
        }
        self.last_detent = detent;
        self.movement = self.movement.wrapping_add(delta);
        self.pending.movement = true;

        if self.button_down && !self.press.press_and_rotate {
            self.press.press_and_rotate = true;
            self.pending.press_and_rotate = true;
            self.pending.click = false;
            self.pending.long_press = false;
            self.pending.ultra_long_press = false;
            self.first_click_at = None;
            self.press.long_reached = false;
            self.press.ultra_notified = false;
        }
    }

    fn process_hold(&mut self, now: u32) {
        if !self.button_down || self.press.press_and_rotate {
            return;
        }
        let held = now.wrapping_sub(self.press_start);

        if held >= self.timing.long_press_ms {
            self.press.long_reached = true;
        }
        if held >= self.timing.ultra_long_press_ms && !self.press.ultra_notified {
            self.pending.ultra_long_press = true;
            self.press.ultra_notified = true;
        }
    }

    fn process_double_click_timeout(&mut self, now: u32) {
        let Some(at) = self.first_click_at else {
            return;
        };
        // A second press is a candidate second click until it outlasts a click
        let expired = if self.button_down {
            now.wrapping_sub(self.press_start) >= self.timing.click_max_ms
        } else {
            now.wrapping_sub(at) > self.timing.double_click_window_ms
        };
        if expired {
            self.first_click_at = None;
            self.confirm_click();
        }
    }

    /// Take the accumulated detent count
    ///
    /// Returns 0 while the button is held or press-and-rotate is active;
    /// that movement is reserved for the press-and-rotate consumer.
    pub fn consume_movement(&mut self) -> i32 {
        if self.button_down || self.press.press_and_rotate || !self.pending.movement {
            return 0;
        }
        self.pending.movement = false;
        core::mem::take(&mut self.movement)
    }

    pub fn consume_clicked(&mut self) -> bool {
        take(&mut self.pending.click)
    }

    pub fn consume_long_pressed(&mut self) -> bool {
        take(&mut self.pending.long_press)
    }

    pub fn consume_ultra_long_pressed(&mut self) -> bool {
        take(&mut self.pending.ultra_long_press)
    }

    pub fn consume_double_clicked(&mut self) -> bool {
        take(&mut self.pending.double_click)
    }

    /// Check if a press-and-rotate gesture started since the last call
    pub fn consume_press_and_rotate(&mut self) -> bool {
        take(&mut self.pending.press_and_rotate)
    }

    /// Take the detent count of an active press-and-rotate hold
    pub fn consume_press_and_rotate_movement(&mut self) -> i32 {
        if !self.press.press_and_rotate || !self.pending.movement {
            return 0;
        }
        self.pending.movement = false;
        core::mem::take(&mut self.movement)
    }

    /// Button level at the last sample
    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    /// Duration of the ongoing press in ms, 0 when released
    pub fn current_press_time(&self) -> u32 {
        if self.button_down {
            self.clock.now_ms().wrapping_sub(self.press_start)
        } else {
            0
        }
    }

    /// Duration of the last completed press in ms
    pub fn last_press_duration(&self) -> u32 {
        self.last_press_duration
    }

    /// Clear the last press duration, returns whether it was set
    pub fn reset_last_press_duration(&mut self) -> bool {
        core::mem::take(&mut self.last_press_duration) != 0
    }

    /// Check if the current hold has passed the long-press floor
    ///
    /// Not consumed. Used to trigger hold feedback once.
    pub fn long_press_reached(&self) -> bool {
        self.press.long_reached
    }

    /// Current node of the gesture state machine
    pub fn phase(&self) -> GesturePhase {
        if self.press.press_and_rotate {
            GesturePhase::PressAndRotate
        } else if self.button_down {
            GesturePhase::Pressed
        } else if self.first_click_at.is_some() {
            GesturePhase::WaitingSecondClick
        } else {
            GesturePhase::Idle
        }
    }

    /// Drop all gesture state and take a new baseline
    pub fn reset(&mut self) {
        self.last_detent = self.hardware.position().div_euclid(self.counts_per_detent);
        self.movement = 0;
        self.button_down = false;
        self.press_start = 0;
        self.last_press_duration = 0;
        self.first_click_at = None;
        self.pending = Pending::default();
        self.press = PressLatches::default();
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

fn take(flag: &mut bool) -> bool {
    core::mem::replace(flag, false)
}
