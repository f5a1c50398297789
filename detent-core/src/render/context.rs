//! Render context tick
//!
//! One tick samples the encoder, forwards the gestures to the coordination
//! context, applies the directives that came back and draws a frame. The
//! caller provides the cadence.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::channel::EventChannel;
use crate::event::Event;
use crate::input::EncoderInput;
use crate::traits::{Clock, EncoderHardware, RenderTarget};

/// Outcome of one render tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Events accepted by the channel
    pub sent: u8,
    /// Events dropped because the coordination queue was full
    pub rejected: u8,
    /// Directives applied to the display
    pub shown: u8,
    /// The current hold passed the long-press floor on this tick
    pub long_press_reached: bool,
}

/// State owned by the render/input context
pub struct RenderContext<'a, H, C, T, M, const N: usize>
where
    H: EncoderHardware,
    C: Clock,
    T: RenderTarget,
    M: RawMutex,
{
    channel: &'a EventChannel<M, N>,
    encoder: EncoderInput<H, C>,
    target: T,
    hold_cued: bool,
}

impl<'a, H, C, T, M, const N: usize> RenderContext<'a, H, C, T, M, N>
where
    H: EncoderHardware,
    C: Clock,
    T: RenderTarget,
    M: RawMutex,
{
    pub fn new(channel: &'a EventChannel<M, N>, encoder: EncoderInput<H, C>, target: T) -> Self {
        Self {
            channel,
            encoder,
            target,
            hold_cued: false,
        }
    }

    /// Run one tick
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        self.encoder.update();
        self.emit_gestures(&mut report);

        while let Some(event) = self.channel.try_receive_from_coordination() {
            self.target.show(&event);
            report.shown = report.shown.saturating_add(1);
        }

        self.target.update();
        report
    }

    fn emit_gestures(&mut self, report: &mut TickReport) {
        let channel = self.channel;
        let encoder = &mut self.encoder;
        let mut send = |event: Event| {
            if channel.send_to_coordination(event) {
                report.sent = report.sent.saturating_add(1);
            } else {
                report.rejected = report.rejected.saturating_add(1);
            }
        };

        let movement = encoder.consume_movement();
        if movement != 0 {
            send(Event::EncoderRotation(movement));
        }
        if encoder.consume_clicked() {
            send(Event::EncoderClick);
        }
        if encoder.consume_double_clicked() {
            send(Event::EncoderDoubleClick);
        }
        if encoder.consume_long_pressed() {
            send(Event::EncoderLongPress);
        }
        if encoder.consume_ultra_long_pressed() {
            send(Event::EncoderUltraLongPress);
        }

        let started = encoder.consume_press_and_rotate();
        let steps = encoder.consume_press_and_rotate_movement();
        if started || steps != 0 {
            send(Event::EncoderPressAndRotate(steps));
        }

        if encoder.is_button_down() {
            send(Event::EncoderPressTime(encoder.current_press_time()));
        }

        let duration = encoder.last_press_duration();
        if encoder.reset_last_press_duration() {
            send(Event::EncoderButtonReleased(duration));
        }

        let reached = encoder.long_press_reached();
        report.long_press_reached = reached && !self.hold_cued;
        self.hold_cued = reached;
    }

    /// Drop all local state after a health-driven restart
    ///
    /// Events already in the channel are left alone.
    pub fn reset(&mut self) {
        self.encoder.reset();
        self.target.reset();
        self.hold_cued = false;
    }

    pub fn encoder(&self) -> &EncoderInput<H, C> {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut EncoderInput<H, C> {
        &mut self.encoder
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}
