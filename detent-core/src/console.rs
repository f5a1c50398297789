//! Serial console commands
//!
//! Line assembly from raw bytes and parsing of the command set. Replies
//! implement `Display` so the firmware can write them to any text sink.

use core::fmt;

use heapless::String;

use crate::system::{NetworkState, SystemState};

/// Longest accepted command line
pub const MAX_LINE_LEN: usize = 32;

/// Commands and their help text
pub const COMMANDS: &[(&str, &str)] = &[
    ("help", "Show this help"),
    ("status", "Show system information"),
    ("reboot", "Restart the device"),
];

/// Parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    Help,
    Status,
    Reboot,
    /// Anything else, including over-long lines
    Unknown,
}

impl ConsoleCommand {
    /// Parse a line, ignoring surrounding whitespace and case
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.eq_ignore_ascii_case("help") {
            ConsoleCommand::Help
        } else if line.eq_ignore_ascii_case("status") {
            ConsoleCommand::Status
        } else if line.eq_ignore_ascii_case("reboot") {
            ConsoleCommand::Reboot
        } else {
            ConsoleCommand::Unknown
        }
    }
}

/// Assembles bytes into command lines
#[derive(Debug, Default)]
pub struct LineReader {
    buffer: String<MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            overflowed: false,
        }
    }

    /// Feed one byte, returning a command when a line completes
    ///
    /// Lines end at `\r` or `\n`. Empty lines yield nothing and non-ASCII
    /// bytes are dropped.
    pub fn push(&mut self, byte: u8) -> Option<ConsoleCommand> {
        match byte {
            b'\r' | b'\n' => {
                let command = if self.overflowed {
                    Some(ConsoleCommand::Unknown)
                } else if self.buffer.trim().is_empty() {
                    None
                } else {
                    Some(ConsoleCommand::parse(&self.buffer))
                };
                self.buffer.clear();
                self.overflowed = false;
                command
            }
            byte if byte.is_ascii() && !byte.is_ascii_control() => {
                if self.buffer.push(char::from(byte)).is_err() {
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }
}

/// Device status for the `status` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    pub state: SystemState,
    pub time_in_state_ms: u32,
    pub uptime_ms: u32,
    pub cycles: u32,
    pub events_processed: u32,
    /// `None` when the device has no network collaborator
    pub network: Option<NetworkState>,
}

/// Reply to a console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleReply {
    Help,
    Status(StatusSnapshot),
    /// Caller performs the reset after writing the reply
    RebootRequested,
    Unknown,
}

impl fmt::Display for ConsoleReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleReply::Help => {
                writeln!(f, "Commands:")?;
                for (name, help) in COMMANDS {
                    writeln!(f, "  {:<8} - {}", name, help)?;
                }
                Ok(())
            }
            ConsoleReply::Status(status) => {
                writeln!(f, "Status:")?;
                writeln!(f, "  State: {} ({} ms)", status.state.label(), status.time_in_state_ms)?;
                writeln!(f, "  Uptime: {} s", status.uptime_ms / 1000)?;
                writeln!(f, "  Cycles: {}", status.cycles)?;
                writeln!(f, "  Events: {}", status.events_processed)?;
                if let Some(network) = status.network {
                    writeln!(f, "  Network: {}", network.label())?;
                }
                Ok(())
            }
            ConsoleReply::RebootRequested => writeln!(f, "Rebooting..."),
            ConsoleReply::Unknown => writeln!(f, "Unknown command, type 'help'"),
        }
    }
}
