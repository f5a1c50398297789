//! Application layer

use crate::event::Event;

/// Higher-level application driven by the coordinator
pub trait Application {
    /// One-time setup, called before the first cycle
    fn initialize(&mut self);

    /// Called once per coordination cycle
    fn update(&mut self);

    /// Receives every event before built-in feedback runs
    fn process_event(&mut self, event: &Event);
}
