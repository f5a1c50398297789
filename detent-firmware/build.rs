//! Build script for detent-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIO pins owned by the console UART
const RESERVED_PINS: [u8; 2] = [0, 1];

/// Highest GPIO number on the RP2040
const MAX_GPIO: u8 = 29;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds device.toml as its configuration.           ║\n\
            ║  Please create one in the detent-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_system(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in device.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only known sections, each a table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !["encoder", "timing", "feedback", "system"].contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Parse the "^!gpioN" pin syntax into a GPIO number
fn parse_pin(value: &str) -> Option<u8> {
    let mut s = value;
    while let Some(rest) = s.strip_prefix('^').or_else(|| s.strip_prefix('!')) {
        s = rest;
    }
    s.strip_prefix("gpio")?.parse().ok()
}

/// Pin syntax, range, reservations and conflicts
fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let roles = [
        ("encoder", "pin_a"),
        ("encoder", "pin_b"),
        ("encoder", "button"),
        ("feedback", "led_red"),
        ("feedback", "led_green"),
        ("feedback", "led_blue"),
        ("feedback", "buzzer"),
    ];

    let mut used: Vec<(u8, String)> = Vec::new();
    for (section, key) in roles {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        let role = format!("[{}] {}", section, key);
        let Some(text) = value.as_str() else {
            errors.push(format!("{} must be a string", role));
            continue;
        };
        let Some(pin) = parse_pin(text) else {
            errors.push(format!("{} invalid pin '{}'", role, text));
            continue;
        };
        if pin > MAX_GPIO {
            errors.push(format!("{} gpio{} out of range", role, pin));
        } else if RESERVED_PINS.contains(&pin) {
            errors.push(format!("{} gpio{} is reserved for the console", role, pin));
        } else if let Some((_, other)) = used.iter().find(|(p, _)| *p == pin) {
            errors.push(format!("{} gpio{} already used by {}", role, pin, other));
        } else {
            used.push((pin, role));
        }
    }

    if let Some(counts) = config.get("encoder").and_then(|e| e.get("counts_per_detent")) {
        match counts.as_integer() {
            Some(n) if (1..=255).contains(&n) => {}
            _ => errors.push("[encoder] counts_per_detent must be 1-255".to_string()),
        }
    }
}

/// Gesture thresholds must ascend
fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(timing) = config.get("timing") else {
        return;
    };
    let get = |key: &str, default: i64| timing.get(key).and_then(|v| v.as_integer()).unwrap_or(default);

    let click = get("click_max_ms", 500);
    let long = get("long_press_ms", 1000);
    let ultra = get("ultra_long_press_ms", 3000);
    let window = get("double_click_window_ms", 500);

    if !(click < long && long < ultra) {
        errors.push(format!(
            "[timing] need click_max_ms < long_press_ms < ultra_long_press_ms ({}/{}/{})",
            click, long, ultra
        ));
    }
    if window <= 0 {
        errors.push("[timing] double_click_window_ms must be positive".to_string());
    }
}

/// System section value types
fn validate_system(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(system) = config.get("system") else {
        return;
    };
    if let Some(value) = system.get("network_required") {
        if !value.is_bool() {
            errors.push("[system] network_required must be true or false".to_string());
        }
    }
    if let Some(toml::Value::Integer(period)) = system.get("render_period_ms") {
        if *period <= 0 {
            errors.push("[system] render_period_ms must be positive".to_string());
        }
    }
}
