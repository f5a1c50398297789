//! Events exchanged between the render and coordination contexts
//!
//! Every event is a plain value. Payloads live inside their variant so
//! that a consumer cannot read a value from a kind that does not carry one.

use core::fmt::Write;

use heapless::String;

/// Maximum length of a text payload in bytes
pub const MAX_TEXT_LEN: usize = 64;

/// Bounded text payload
pub type Text = String<MAX_TEXT_LEN>;

/// Separator between network name and address in the AP-mode payload
pub const AP_FIELD_SEPARATOR: char = '|';

/// Events carried by the [`EventChannel`](crate::channel::EventChannel)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Render -> coordination: encoder gestures
    /// Knob rotated, signed detent count (positive = clockwise)
    EncoderRotation(i32),
    /// Single click, confirmed after the double-click window closed
    EncoderClick,
    /// Press released between the long-press and ultra-long floors
    EncoderLongPress,
    /// Press held past the ultra-long floor (fires while still held)
    EncoderUltraLongPress,
    /// Two clicks inside the double-click window
    EncoderDoubleClick,
    /// Rotation while the button is held, signed detent count
    EncoderPressAndRotate(i32),
    /// Live press duration in ms, sent every render tick while held
    EncoderPressTime(u32),
    /// Completed press duration in ms
    EncoderButtonReleased(u32),

    // Lifecycle notifications for the application
    /// Boot animation finished
    BootingComplete,
    /// Network association started
    WifiConnecting,
    /// Network association succeeded
    WifiConnected,
    /// Network association failed, falling back to local AP
    WifiDisconnected,

    // Coordination -> render: display directives
    /// Show the "connecting" view
    DisplayWifiConnecting,
    /// Return to the idle view
    DisplayWakeUp,
    /// Show AP setup instructions, payload is `"<ssid>|<address>"`
    DisplayWifiApMode(Text),
    /// Show the setup URL for a connected AP client
    DisplayWifiSetupUrl(Text),
    /// Show the terminal fault view
    DisplayFault,
}

/// Fieldless discriminant of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    EncoderRotation,
    EncoderClick,
    EncoderLongPress,
    EncoderUltraLongPress,
    EncoderDoubleClick,
    EncoderPressAndRotate,
    EncoderPressTime,
    EncoderButtonReleased,
    BootingComplete,
    WifiConnecting,
    WifiConnected,
    WifiDisconnected,
    DisplayWifiConnecting,
    DisplayWakeUp,
    DisplayWifiApMode,
    DisplayWifiSetupUrl,
    DisplayFault,
}

impl Event {
    /// Build the AP-mode directive from network name and address
    ///
    /// The payload is truncated at [`MAX_TEXT_LEN`] bytes.
    pub fn wifi_ap_mode(ssid: &str, address: &str) -> Self {
        let mut text = Text::new();
        push_truncated(&mut text, ssid);
        let _ = text.push(AP_FIELD_SEPARATOR);
        push_truncated(&mut text, address);
        Event::DisplayWifiApMode(text)
    }

    /// Build the setup-URL directive for a local AP address
    pub fn wifi_setup_url(address: &str) -> Self {
        let mut text = Text::new();
        // An address too long for the payload leaves the URL without its tail
        let _ = write!(text, "http://{}/setup", address);
        Event::DisplayWifiSetupUrl(text)
    }

    /// Get the fieldless kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Event::EncoderRotation(_) => EventKind::EncoderRotation,
            Event::EncoderClick => EventKind::EncoderClick,
            Event::EncoderLongPress => EventKind::EncoderLongPress,
            Event::EncoderUltraLongPress => EventKind::EncoderUltraLongPress,
            Event::EncoderDoubleClick => EventKind::EncoderDoubleClick,
            Event::EncoderPressAndRotate(_) => EventKind::EncoderPressAndRotate,
            Event::EncoderPressTime(_) => EventKind::EncoderPressTime,
            Event::EncoderButtonReleased(_) => EventKind::EncoderButtonReleased,
            Event::BootingComplete => EventKind::BootingComplete,
            Event::WifiConnecting => EventKind::WifiConnecting,
            Event::WifiConnected => EventKind::WifiConnected,
            Event::WifiDisconnected => EventKind::WifiDisconnected,
            Event::DisplayWifiConnecting => EventKind::DisplayWifiConnecting,
            Event::DisplayWakeUp => EventKind::DisplayWakeUp,
            Event::DisplayWifiApMode(_) => EventKind::DisplayWifiApMode,
            Event::DisplayWifiSetupUrl(_) => EventKind::DisplayWifiSetupUrl,
            Event::DisplayFault => EventKind::DisplayFault,
        }
    }

    /// Integer payload, if this kind carries one
    pub fn value(&self) -> Option<i32> {
        match self {
            Event::EncoderRotation(steps) | Event::EncoderPressAndRotate(steps) => Some(*steps),
            Event::EncoderPressTime(ms) | Event::EncoderButtonReleased(ms) => {
                Some(i32::try_from(*ms).unwrap_or(i32::MAX))
            }
            _ => None,
        }
    }

    /// Text payload, if this kind carries one
    pub fn text(&self) -> Option<&str> {
        match self {
            Event::DisplayWifiApMode(text) | Event::DisplayWifiSetupUrl(text) => {
                Some(text.as_str())
            }
            _ => None,
        }
    }

    /// Split an AP-mode payload into `(ssid, address)`
    pub fn ap_fields(&self) -> Option<(&str, &str)> {
        match self {
            Event::DisplayWifiApMode(text) => text.as_str().split_once(AP_FIELD_SEPARATOR),
            _ => None,
        }
    }

    /// Check if this event originates from the encoder
    pub fn is_encoder_event(&self) -> bool {
        matches!(
            self,
            Event::EncoderRotation(_)
                | Event::EncoderClick
                | Event::EncoderLongPress
                | Event::EncoderUltraLongPress
                | Event::EncoderDoubleClick
                | Event::EncoderPressAndRotate(_)
                | Event::EncoderPressTime(_)
                | Event::EncoderButtonReleased(_)
        )
    }

    /// Check if this event is a directive for the render context
    pub fn is_display_directive(&self) -> bool {
        matches!(
            self,
            Event::DisplayWifiConnecting
                | Event::DisplayWakeUp
                | Event::DisplayWifiApMode(_)
                | Event::DisplayWifiSetupUrl(_)
                | Event::DisplayFault
        )
    }
}

/// Push as much of `s` as fits, never splitting a UTF-8 character
fn push_truncated(text: &mut Text, s: &str) {
    for c in s.chars() {
        if text.push(c).is_err() {
            break;
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, f: defmt::Formatter) {
        match self.text() {
            Some(text) => defmt::write!(f, "{}({=str})", self.kind(), text),
            None => match self.value() {
                Some(value) => defmt::write!(f, "{}({})", self.kind(), value),
                None => defmt::write!(f, "{}", self.kind()),
            },
        }
    }
}
