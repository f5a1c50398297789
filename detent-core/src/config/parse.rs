//! Minimal TOML parser for `device.toml`
//!
//! Handles only the subset the device configuration uses:
//! - `[section]` headers
//! - `key = value` pairs with string, integer and boolean values
//! - Comments (`# ...`), including trailing ones
//!
//! Missing keys keep their defaults. The parsed configuration is validated
//! before it is returned.

use super::types::{
    ConfigError, DeviceConfig, EncoderConfig, FeedbackConfig, PinConfig, SystemConfig,
    TimingConfig,
};

/// Parse error for a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not a `key = value` pair
    InvalidLine,
    /// Key not known in the current section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Encoder,
    Timing,
    Feedback,
    System,
}

/// Parse `device.toml` contents into a validated [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        parse_line(line, &mut section, &mut config).map_err(|error| ConfigError::Parse {
            line: index + 1,
            error,
        })?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_line(line: &str, section: &mut Section, config: &mut DeviceConfig) -> Result<(), ParseError> {
    if let Some(header) = line.strip_prefix('[') {
        let name = header.strip_suffix(']').ok_or(ParseError::InvalidSection)?;
        *section = parse_section_header(name.trim())?;
        return Ok(());
    }

    let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
    match section {
        Section::Root => Err(ParseError::UnknownKey),
        Section::Encoder => apply_encoder(&mut config.encoder, key, value),
        Section::Timing => apply_timing(&mut config.timing, key, value),
        Section::Feedback => apply_feedback(&mut config.feedback, key, value),
        Section::System => apply_system(&mut config.system, key, value),
    }
}

fn parse_section_header(name: &str) -> Result<Section, ParseError> {
    match name {
        "encoder" => Ok(Section::Encoder),
        "timing" => Ok(Section::Timing),
        "feedback" => Ok(Section::Feedback),
        "system" => Ok(Section::System),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_encoder(encoder: &mut EncoderConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "pin_a" => encoder.pin_a = parse_pin(value)?,
        "pin_b" => encoder.pin_b = parse_pin(value)?,
        "button" => encoder.button = parse_pin(value)?,
        "counts_per_detent" => encoder.counts_per_detent = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_timing(timing: &mut TimingConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "click_max_ms" => timing.click_max_ms = parse_int(value)?,
        "long_press_ms" => timing.long_press_ms = parse_int(value)?,
        "ultra_long_press_ms" => timing.ultra_long_press_ms = parse_int(value)?,
        "double_click_window_ms" => timing.double_click_window_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_feedback(feedback: &mut FeedbackConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "led_red" => feedback.led_red = parse_pin(value)?,
        "led_green" => feedback.led_green = parse_pin(value)?,
        "led_blue" => feedback.led_blue = parse_pin(value)?,
        "buzzer" => feedback.buzzer = parse_pin(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_system(system: &mut SystemConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "network_required" => system.network_required = parse_bool(value)?,
        "boot_duration_ms" => system.boot_duration_ms = parse_int(value)?,
        "health_interval_ms" => system.health_interval_ms = parse_int(value)?,
        "stack_critical_bytes" => system.stack_critical_bytes = parse_int(value)?,
        "low_memory_bytes" => system.low_memory_bytes = parse_int(value)?,
        "render_period_ms" => system.render_period_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Cut a trailing comment, ignoring `#` inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
pub fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut pin = PinConfig::default();

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            pin.inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pin.pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    pin.pin = number.parse().map_err(|_| ParseError::InvalidPin)?;
    Ok(pin)
}
