//! Collaborators for the reference board
//!
//! The board has no radio. Its network and portal types are uninhabited,
//! so the coordinator always receives `None` for both.

use defmt::*;
use embassy_time::Instant;

use detent_core::system::NetworkState;
use detent_core::traits::{Application, Clock, ConfigPortal, NetworkLink, Platform};
use detent_core::Event;

use crate::contexts::StackProbe;
use crate::feedback::{BuzzerHandle, LedHandle};

/// Coordinator platform for this board
pub struct Board;

impl Platform for Board {
    type Clock = UptimeClock;
    type Network = NoRadio;
    type Portal = NoPortal;
    type Led = LedHandle;
    type Buzzer = BuzzerHandle;
    type App = LogApp;
    type Probe = StackProbe;
}

/// Milliseconds since boot from the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u32 {
        // Truncation gives the wrapping millisecond counter
        Instant::now().as_millis() as u32
    }
}

/// Network link of a board without a radio
pub enum NoRadio {}

impl NetworkLink for NoRadio {
    fn update(&mut self) {
        match *self {}
    }

    fn begin_association(&mut self) {
        match *self {}
    }

    fn fallback_to_local_ap(&mut self) {
        match *self {}
    }

    fn state(&self) -> NetworkState {
        match *self {}
    }

    fn has_local_client(&self) -> bool {
        match *self {}
    }

    fn local_address(&self) -> &str {
        match *self {}
    }

    fn network_name(&self) -> &str {
        match *self {}
    }
}

/// Setup portal of a board without a radio
pub enum NoPortal {}

impl ConfigPortal for NoPortal {
    fn start(&mut self) {
        match *self {}
    }

    fn service(&mut self) {
        match *self {}
    }
}

/// Application stand-in that logs what it receives
#[derive(Debug, Default)]
pub struct LogApp {
    events: u32,
    detents: i32,
}

impl Application for LogApp {
    fn initialize(&mut self) {
        info!("Application initialized");
    }

    fn update(&mut self) {}

    fn process_event(&mut self, event: &Event) {
        self.events = self.events.wrapping_add(1);
        match event {
            Event::EncoderRotation(steps) => {
                self.detents = self.detents.wrapping_add(*steps);
                debug!("App: rotation {} (position {})", steps, self.detents);
            }
            Event::BootingComplete => info!("App: boot complete"),
            other => debug!("App: {}", other),
        }
    }
}
