//! Embassy async tasks
//!
//! Core 1 runs the render and quadrature tasks. Core 0 runs everything else.
//! Tasks communicate via the EventChannel and the channels in
//! [`crate::channels`].

pub mod buzzer;
pub mod console;
pub mod coordination;
pub mod led;
pub mod quadrature;
pub mod render;

pub use buzzer::buzzer_task;
pub use console::console_task;
pub use coordination::coordination_task;
pub use led::led_task;
pub use quadrature::quadrature_task;
pub use render::render_task;
