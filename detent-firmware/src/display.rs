//! Display stand-in for the render context
//!
//! The reference board has no panel. Directives are traced over defmt and
//! the current view is tracked so that the log shows what a panel would.

use defmt::*;

use detent_core::traits::RenderTarget;
use detent_core::{Event, EventKind};

/// Log-backed render target
pub struct TraceDisplay {
    view: EventKind,
    frames: u32,
}

impl TraceDisplay {
    pub const fn new() -> Self {
        Self {
            view: EventKind::DisplayWakeUp,
            frames: 0,
        }
    }
}

impl RenderTarget for TraceDisplay {
    fn show(&mut self, event: &Event) {
        if event.is_display_directive() {
            self.view = event.kind();
            match event.ap_fields() {
                Some((ssid, address)) => info!("Display: join '{}' at {}", ssid, address),
                None => info!("Display: {}", event),
            }
        } else {
            // Gesture echo, drawn over the current view
            debug!("Display: {} over {}", event, self.view);
        }
    }

    fn update(&mut self) {
        self.frames = self.frames.wrapping_add(1);
    }

    fn reset(&mut self) {
        info!("Display reset after {} frames", self.frames);
        *self = Self::new();
    }
}
