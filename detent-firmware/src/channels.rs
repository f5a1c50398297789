//! Inter-task communication channels
//!
//! The EventChannel between the two cores is created in `main` and passed
//! to the tasks explicitly. The statics here only connect tasks on core 0.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use detent_core::console::{ConsoleCommand, ConsoleReply};
use detent_core::traits::Rgb;
use detent_core::EventChannel;

/// Channel between the render and coordination contexts
pub type DeviceChannel = EventChannel<CriticalSectionRawMutex>;

/// Channel capacity for LED commands
const LED_CHANNEL_SIZE: usize = 8;

/// Channel capacity for buzzer commands
const BUZZER_CHANNEL_SIZE: usize = 4;

/// LED animation requests from the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LedCommand {
    Flash(Rgb, u16),
    Loading(bool),
    Activate,
    Ambient(bool),
}

/// Buzzer patterns requested by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum BuzzerCommand {
    Confirm,
    Error,
}

/// LED commands (coordinator -> LED task)
pub static LED_COMMANDS: Channel<CriticalSectionRawMutex, LedCommand, LED_CHANNEL_SIZE> =
    Channel::new();

/// Buzzer commands (coordinator -> buzzer task)
pub static BUZZER_COMMANDS: Channel<CriticalSectionRawMutex, BuzzerCommand, BUZZER_CHANNEL_SIZE> =
    Channel::new();

/// Parsed console commands (console -> coordinator)
pub static CONSOLE_COMMANDS: Channel<CriticalSectionRawMutex, ConsoleCommand, 1> = Channel::new();

/// Replies to console commands (coordinator -> console)
pub static CONSOLE_REPLIES: Channel<CriticalSectionRawMutex, ConsoleReply, 1> = Channel::new();
