//! Detent - Rotary Knob Controller Firmware
//!
//! Dual-core firmware for RP2040 boards with a rotary encoder, an RGB
//! status LED and a buzzer.
//!
//! - Core 1 runs the render/input context: quadrature sampling and the
//!   30 Hz render tick that turns encoder activity into gesture events.
//! - Core 0 runs the coordination context: the system coordinator, the
//!   feedback tasks and the serial console.
//!
//! The two cores share nothing but the EventChannel created here.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Executor;
use embassy_rp::bind_interrupts;
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use detent_core::config::{parse_config, DeviceConfig};
use detent_core::system::FaultKind;

use crate::channels::DeviceChannel;
use crate::contexts::{CONSOLE_MONITOR, LED_MONITOR, RENDER_MONITOR};
use crate::encoder::ENCODER_POSITION;
use crate::feedback::RgbLed;
use crate::pins::{PinBank, SetupError};

mod board;
mod channels;
mod contexts;
mod display;
mod encoder;
mod feedback;
mod pins;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

/// Core 1 stack size in bytes
const CORE1_STACK_SIZE: usize = 8 * 1024;

/// Console baud rate
const CONSOLE_BAUD: u32 = 115_200;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

static CORE1_STACK: StaticCell<Stack<CORE1_STACK_SIZE>> = StaticCell::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

// The only state shared between the two cores
static EVENT_CHANNEL: StaticCell<DeviceChannel> = StaticCell::new();

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    info!("Detent firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let (config, startup_fault) = load_config();

    let mut bank = PinBank::new([
        p.PIN_2.into(),
        p.PIN_3.into(),
        p.PIN_4.into(),
        p.PIN_5.into(),
        p.PIN_6.into(),
        p.PIN_7.into(),
        p.PIN_8.into(),
        p.PIN_9.into(),
        p.PIN_10.into(),
        p.PIN_11.into(),
        p.PIN_12.into(),
        p.PIN_13.into(),
        p.PIN_14.into(),
        p.PIN_15.into(),
        p.PIN_16.into(),
        p.PIN_17.into(),
        p.PIN_18.into(),
        p.PIN_19.into(),
        p.PIN_20.into(),
        p.PIN_21.into(),
        p.PIN_22.into(),
        p.PIN_23.into(),
        p.PIN_24.into(),
        p.PIN_25.into(),
        p.PIN_26.into(),
        p.PIN_27.into(),
        p.PIN_28.into(),
        p.PIN_29.into(),
    ]);
    // Pins were checked by load_config, allocation cannot fail
    let (encoder_pins, feedback_pins) = unwrap!(pins::allocate(&mut bank, &config));

    let console = {
        let mut cfg = UartConfig::default();
        cfg.baudrate = CONSOLE_BAUD;
        let tx_buf = TX_BUF.init([0u8; 256]);
        let rx_buf = RX_BUF.init([0u8; 64]);
        let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, cfg);
        uart.into_buffered(Irqs, tx_buf, rx_buf)
    };
    let (console_tx, console_rx) = console.split();
    info!("Console UART initialized");

    let led = RgbLed::new(
        pins::output(feedback_pins.red, config.feedback.led_red),
        pins::output(feedback_pins.green, config.feedback.led_green),
        pins::output(feedback_pins.blue, config.feedback.led_blue),
        config.feedback.led_red.inverted,
    );
    let buzzer = pins::output(feedback_pins.buzzer, config.feedback.buzzer);

    let channel: &'static DeviceChannel = EVENT_CHANNEL.init(DeviceChannel::new());

    // Render/input context on core 1
    let stack = CORE1_STACK.init(Stack::new());
    RENDER_MONITOR.watch_stack(stack);
    let encoder = config.encoder;
    let timing = config.timing;
    let render_period_ms = config.system.render_period_ms;
    spawn_core1(p.CORE1, stack, move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| {
            spawner
                .spawn(tasks::quadrature_task(
                    encoder_pins.a,
                    encoder_pins.b,
                    encoder,
                    &ENCODER_POSITION,
                ))
                .unwrap();
            spawner
                .spawn(tasks::render_task(
                    channel,
                    encoder_pins.button,
                    encoder,
                    timing,
                    render_period_ms,
                ))
                .unwrap();
        })
    });
    info!("Core 1 started");

    // Coordination context on core 0
    contexts::watch_core0_stack(&[&LED_MONITOR, &CONSOLE_MONITOR]);
    let system = config.system;
    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        spawner
            .spawn(tasks::coordination_task(channel, system, startup_fault))
            .unwrap();
        spawner.spawn(tasks::led_task(led)).unwrap();
        spawner.spawn(tasks::buzzer_task(buzzer)).unwrap();
        spawner.spawn(tasks::console_task(console_tx, console_rx)).unwrap();
        info!("All tasks spawned, firmware running");
    })
}

/// Parse the embedded configuration, falling back to defaults
///
/// A rejected configuration still boots on the default pins so the fault
/// can be shown, and is returned as the startup fault. The
/// `network-required` feature overrides device.toml.
fn load_config() -> (DeviceConfig, Option<FaultKind>) {
    let (mut config, fault) = match parse_embedded_config() {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            (config, None)
        }
        Err(e) => {
            // build.rs validates device.toml, so this only trips on checks
            // the build script does not repeat
            error!("Invalid embedded config: {}", e);
            warn!("Using default pins, system will halt in the error state");
            (DeviceConfig::default(), Some(FaultKind::ConfigError))
        }
    };

    if cfg!(feature = "network-required") {
        config.system.network_required = true;
    }

    info!(
        "Encoder on gpio{}/gpio{}, button gpio{}, {} counts per detent",
        config.encoder.pin_a.pin,
        config.encoder.pin_b.pin,
        config.encoder.button.pin,
        config.encoder.counts_per_detent
    );
    info!(
        "Boot {} ms, health every {} ms, network required: {}",
        config.system.boot_duration_ms,
        config.system.health_interval_ms,
        config.system.network_required
    );
    (config, fault)
}

fn parse_embedded_config() -> Result<DeviceConfig, SetupError> {
    let config = parse_config(EMBEDDED_CONFIG)?;
    pins::check_config(&config)?;
    Ok(config)
}
