//! Render-side display

use crate::event::Event;

/// Display collaborator owned by the render context
pub trait RenderTarget {
    /// Apply a directive received from the coordination context
    fn show(&mut self, event: &Event);

    /// Draw one frame
    fn update(&mut self);

    /// Return to the initial view, dropping any local state
    fn reset(&mut self);
}
