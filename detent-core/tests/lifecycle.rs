//! Coordinator lifecycle: boot, network, dispatch and supervision

mod common;

use common::*;
use detent_core::config::{SystemConfig, TimingConfig};
use detent_core::console::{ConsoleCommand, ConsoleReply};
use detent_core::input::EncoderInput;
use detent_core::render::RenderContext;
use detent_core::system::{FaultKind, NetworkState, SystemState, Transition};
use detent_core::traits::{MonitoredContext, Rgb};
use detent_core::{Event, EventChannel};

fn network_config() -> SystemConfig {
    SystemConfig {
        network_required: true,
        ..SystemConfig::default()
    }
}

#[test]
fn boot_holds_then_advances_once() {
    let channel = EventChannel::new();
    let render = TestContext::new("render", Some(4096));
    let contexts: [&dyn MonitoredContext; 1] = [&render];
    let mut coordinator = coordinator(&channel, &contexts, false, SystemConfig::default());
    assert!(coordinator.app().initialized);

    for report in run_until(&mut coordinator, 3999) {
        assert!(report.transitions.is_empty());
    }
    assert_eq!(coordinator.state(), SystemState::Booting);
    assert!(drain_render(&channel).is_empty());

    let report = cycle_at(&mut coordinator, 4000);
    assert_eq!(
        report.transitions.as_slice(),
        &[
            Transition { from: SystemState::Booting, to: SystemState::Initializing, at_ms: 4000 },
            Transition { from: SystemState::Initializing, to: SystemState::Ready, at_ms: 4000 },
            Transition { from: SystemState::Ready, to: SystemState::Running, at_ms: 4000 },
        ]
    );
    assert_eq!(drain_render(&channel), vec![Event::DisplayWakeUp]);
    assert!(coordinator.app().events.contains(&Event::BootingComplete));
    assert_eq!(coordinator.led().calls.last(), Some(&LedCall::Ambient(true)));

    let later = run_until(&mut coordinator, 12_000);
    assert!(later.iter().all(|report| report.transitions.is_empty()));
    assert_eq!(coordinator.state(), SystemState::Running);
}

#[test]
fn reentering_state_keeps_entry_time() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], false, SystemConfig::default());

    cycle_at(&mut coordinator, 4000);
    assert_eq!(coordinator.state_since(), 4000);

    coordinator.clock_mut().0 = 4700;
    assert!(!coordinator.set_state(SystemState::Running));
    assert_eq!(coordinator.state_since(), 4000);
    assert_eq!(coordinator.time_in_state(), 700);
}

#[test]
fn stalled_context_is_terminal() {
    let channel = EventChannel::new();
    let render = TestContext::new("render", Some(4096));
    render.running.set(false);
    let contexts: [&dyn MonitoredContext; 1] = [&render];
    let mut coordinator = coordinator(&channel, &contexts, false, SystemConfig::default());

    let report = cycle_at(&mut coordinator, 4000);
    assert_eq!(coordinator.state(), SystemState::Error(FaultKind::ContextStalled));
    assert_eq!(report.stalled_context, Some("render"));
    assert_eq!(drain_render(&channel), vec![Event::DisplayFault]);
    assert_eq!(coordinator.led().calls, vec![LedCall::Flash(Rgb::RED, 1000)]);
    assert!(!coordinator.app().events.contains(&Event::BootingComplete));

    // Nothing further happens, only the cycle counter moves
    render.running.set(true);
    channel.send_to_coordination(Event::EncoderClick);
    let cycles = coordinator.cycles();
    let reports = run_until(&mut coordinator, 20_000);
    assert!(reports.iter().all(|r| r.transitions.is_empty() && r.health.is_none()));
    assert_eq!(coordinator.cycles(), cycles + reports.len() as u32);
    assert_eq!(coordinator.events_processed(), 0);
    assert_eq!(coordinator.buzzer().confirms, 0);
    assert_eq!(coordinator.app().updates, 0);
}

#[test]
fn network_required_without_network_faults() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], false, network_config());

    cycle_at(&mut coordinator, 4000);
    assert_eq!(coordinator.state(), SystemState::Error(FaultKind::NetworkUnavailable));
    assert_eq!(drain_render(&channel), vec![Event::DisplayFault]);
}

#[test]
fn network_connect_flow() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], true, network_config());

    let report = cycle_at(&mut coordinator, 4000);
    assert_eq!(coordinator.state(), SystemState::WifiConnecting);
    assert_eq!(report.transitions.len(), 2);
    assert_eq!(coordinator.network().map(|n| n.associations), Some(1));
    assert_eq!(coordinator.led().calls, vec![LedCall::Loading(true)]);
    // The Connecting edge in the same cycle adds no second directive
    assert_eq!(drain_render(&channel), vec![Event::DisplayWifiConnecting]);
    assert_eq!(
        &coordinator.app().events[..],
        &[Event::BootingComplete, Event::WifiConnecting]
    );

    // Level repeats are ignored
    cycle_at(&mut coordinator, 4050);
    assert_eq!(coordinator.led().calls.len(), 1);

    if let Some(network) = coordinator.network_mut() {
        network.state = NetworkState::Connected;
    }
    let report = cycle_at(&mut coordinator, 4100);
    assert_eq!(coordinator.state(), SystemState::Running);
    assert_eq!(report.transitions.len(), 2);
    assert_eq!(drain_render(&channel), vec![Event::DisplayWakeUp]);
    assert_eq!(
        coordinator.led().calls[1..],
        [
            LedCall::Loading(false),
            LedCall::Flash(Rgb::GREEN, 500),
            LedCall::Ambient(true),
        ]
    );
    assert_eq!(coordinator.app().events.last(), Some(&Event::WifiConnected));
}

#[test]
fn network_failure_falls_back_to_access_point() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], true, network_config());

    cycle_at(&mut coordinator, 4000);
    drain_render(&channel);

    if let Some(network) = coordinator.network_mut() {
        network.state = NetworkState::Timeout;
    }
    cycle_at(&mut coordinator, 4050);
    assert_eq!(coordinator.network().map(|n| n.fallbacks), Some(1));
    assert_eq!(coordinator.app().events.last(), Some(&Event::WifiDisconnected));
    assert_eq!(coordinator.state(), SystemState::WifiConnecting);

    // The AP comes up and is noticed on the next cycle
    cycle_at(&mut coordinator, 4100);
    assert_eq!(coordinator.state(), SystemState::WifiApMode);
    assert_eq!(coordinator.portal().map(|p| p.starts), Some(1));
    assert_eq!(coordinator.portal().map(|p| p.services), Some(1));
    assert_eq!(
        drain_render(&channel),
        vec![Event::wifi_ap_mode(AP_NAME, AP_ADDRESS)]
    );
    assert_eq!(coordinator.led().calls.last(), Some(&LedCall::Flash(Rgb::BLUE, 1000)));

    if let Some(network) = coordinator.network_mut() {
        network.client = true;
    }
    cycle_at(&mut coordinator, 4150);
    let events = drain_render(&channel);
    assert_eq!(events, vec![Event::wifi_setup_url(AP_ADDRESS)]);
    assert_eq!(events[0].text(), Some("http://192.168.4.1/setup"));
    assert_eq!(coordinator.led().calls.last(), Some(&LedCall::Flash(Rgb::GREEN, 300)));

    // Client still connected: no repeat
    cycle_at(&mut coordinator, 4200);
    assert!(drain_render(&channel).is_empty());
    assert_eq!(coordinator.portal().map(|p| p.services), Some(3));
}

#[test]
fn startup_fault_is_terminal() {
    let channel = EventChannel::new();
    let render = TestContext::new("render", Some(4096));
    let contexts: [&dyn MonitoredContext; 1] = [&render];
    let mut coordinator = coordinator(&channel, &contexts, false, SystemConfig::default());

    coordinator.fault(FaultKind::ConfigError);
    assert_eq!(coordinator.state(), SystemState::Error(FaultKind::ConfigError));
    assert_eq!(drain_render(&channel), vec![Event::DisplayFault]);
    assert_eq!(coordinator.led().calls, vec![LedCall::Flash(Rgb::RED, 1000)]);

    // Boot never completes and a repeated fault changes nothing
    coordinator.fault(FaultKind::ConfigError);
    channel.send_to_coordination(Event::EncoderClick);
    let first = cycle_at(&mut coordinator, 50);
    assert_eq!(
        first.transitions.as_slice(),
        &[Transition {
            from: SystemState::Booting,
            to: SystemState::Error(FaultKind::ConfigError),
            at_ms: 0,
        }]
    );
    let reports = run_until(&mut coordinator, 10_000);
    assert!(reports.iter().all(|r| r.transitions.is_empty() && r.health.is_none()));
    assert_eq!(coordinator.state(), SystemState::Error(FaultKind::ConfigError));
    assert!(drain_render(&channel).is_empty());
    assert_eq!(coordinator.led().calls.len(), 1);
    assert!(!coordinator.app().events.contains(&Event::BootingComplete));
    assert_eq!(coordinator.events_processed(), 0);
}

#[test]
fn every_failure_state_falls_back_once_per_edge() {
    for failure in [
        NetworkState::CredentialsNotFound,
        NetworkState::Timeout,
        NetworkState::AssociationError,
    ] {
        let channel = EventChannel::new();
        let mut coordinator = coordinator(&channel, &[], true, network_config());
        cycle_at(&mut coordinator, 4000);

        if let Some(network) = coordinator.network_mut() {
            network.state = failure;
        }
        cycle_at(&mut coordinator, 4050);
        assert_eq!(coordinator.network().map(|n| n.fallbacks), Some(1), "{failure:?}");

        // The same level seen again is not a new edge
        if let Some(network) = coordinator.network_mut() {
            network.state = failure;
        }
        cycle_at(&mut coordinator, 4100);
        assert_eq!(coordinator.network().map(|n| n.fallbacks), Some(1), "{failure:?}");

        // A fresh attempt that fails again falls back again
        if let Some(network) = coordinator.network_mut() {
            network.state = NetworkState::Connecting;
        }
        cycle_at(&mut coordinator, 4150);
        if let Some(network) = coordinator.network_mut() {
            network.state = failure;
        }
        cycle_at(&mut coordinator, 4200);
        assert_eq!(coordinator.network().map(|n| n.fallbacks), Some(2), "{failure:?}");

        let disconnects = coordinator
            .app()
            .events
            .iter()
            .filter(|event| **event == Event::WifiDisconnected)
            .count();
        assert_eq!(disconnects, 2, "{failure:?}");
        assert_eq!(coordinator.state(), SystemState::WifiConnecting, "{failure:?}");
    }
}

#[test]
fn reconnect_from_running() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], true, network_config());
    cycle_at(&mut coordinator, 4000);
    if let Some(network) = coordinator.network_mut() {
        network.state = NetworkState::Connected;
    }
    cycle_at(&mut coordinator, 4050);
    assert_eq!(coordinator.state(), SystemState::Running);
    drain_render(&channel);
    let led_calls = coordinator.led().calls.len();

    // The link drops back to associating
    if let Some(network) = coordinator.network_mut() {
        network.state = NetworkState::Connecting;
    }
    let report = cycle_at(&mut coordinator, 4100);
    assert_eq!(coordinator.state(), SystemState::WifiConnecting);
    assert_eq!(
        report.transitions.as_slice(),
        &[Transition { from: SystemState::Running, to: SystemState::WifiConnecting, at_ms: 4100 }]
    );
    assert_eq!(drain_render(&channel), vec![Event::DisplayWifiConnecting]);
    assert_eq!(coordinator.led().calls[led_calls..], [LedCall::Loading(true)]);
    assert_eq!(coordinator.app().events.last(), Some(&Event::WifiConnecting));

    if let Some(network) = coordinator.network_mut() {
        network.state = NetworkState::Connected;
    }
    cycle_at(&mut coordinator, 4150);
    assert_eq!(coordinator.state(), SystemState::Running);
    assert_eq!(drain_render(&channel), vec![Event::DisplayWakeUp]);
    assert_eq!(coordinator.led().calls.last(), Some(&LedCall::Ambient(true)));
    assert_eq!(coordinator.app().events.last(), Some(&Event::WifiConnected));
}

#[test]
fn encoder_events_dispatched_and_echoed() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], false, SystemConfig::default());
    cycle_at(&mut coordinator, 4000);
    drain_render(&channel);
    let app_events_before = coordinator.app().events.len();

    channel.send_to_coordination(Event::EncoderRotation(2));
    channel.send_to_coordination(Event::EncoderClick);
    channel.send_to_coordination(Event::EncoderLongPress);
    channel.send_to_coordination(Event::EncoderDoubleClick);

    let report = cycle_at(&mut coordinator, 4050);
    assert_eq!(report.events_dispatched, 4);
    assert_eq!(coordinator.events_processed(), 4);
    assert_eq!(
        &coordinator.app().events[app_events_before..],
        &[
            Event::EncoderRotation(2),
            Event::EncoderClick,
            Event::EncoderLongPress,
            Event::EncoderDoubleClick,
        ]
    );

    let led = &coordinator.led().calls;
    assert_eq!(
        led[led.len() - 3..],
        [
            LedCall::Activate,
            LedCall::Flash(Rgb::GREEN, 200),
            LedCall::Flash(Rgb::ORANGE, 500),
        ]
    );
    assert_eq!(coordinator.buzzer().confirms, 1);
    assert_eq!(coordinator.buzzer().errors, 1);
    assert_eq!(
        drain_render(&channel),
        vec![Event::EncoderRotation(2), Event::EncoderClick, Event::EncoderLongPress]
    );
}

#[test]
fn health_check_restarts_low_stack_context() {
    let channel = EventChannel::new();
    let render = TestContext::new("render", Some(2048));
    let led = TestContext::new("led", Some(256));
    let contexts: [&dyn MonitoredContext; 2] = [&render, &led];
    let mut coordinator = coordinator(&channel, &contexts, false, SystemConfig::default());

    let reports = run_until(&mut coordinator, 5000);
    assert!(reports.iter().all(|r| r.health.is_none()));

    let report = cycle_at(&mut coordinator, 5050);
    let health = report.health.expect("health check due");
    assert_eq!(health.restarts, 1);
    assert_eq!(health.stats.cycles, coordinator.cycles());
    assert_eq!(render.restarts.get(), 0);
    assert_eq!(led.restarts.get(), 1);

    // Interval is measured from the last check
    led.margin.set(Some(4096));
    let reports = run_until(&mut coordinator, 10_050);
    assert!(reports.iter().all(|r| r.health.is_none()));
    let report = cycle_at(&mut coordinator, 10_100);
    assert_eq!(report.health.map(|h| h.restarts), Some(0));
    assert_eq!(led.restarts.get(), 1);
}

#[test]
fn render_to_coordinator_round_trip() {
    let channel = EventChannel::new();
    let clock = TestClock(0);
    let encoder = EncoderInput::new(TestEncoder::default(), &clock, TimingConfig::default(), 4);
    let mut render = RenderContext::new(&channel, encoder, TestDisplay::default());
    let mut coordinator = coordinator(&channel, &[], false, SystemConfig::default());
    cycle_at(&mut coordinator, 4000);

    render.encoder_mut().hardware_mut().position = 12;
    let tick = render.tick();
    assert_eq!(tick.sent, 1);
    // Wake-up directive from boot
    assert_eq!(render.target().shown, vec![Event::DisplayWakeUp]);

    let report = cycle_at(&mut coordinator, 4050);
    assert_eq!(report.events_dispatched, 1);
    assert_eq!(coordinator.led().calls.last(), Some(&LedCall::Activate));

    render.tick();
    assert_eq!(
        render.target().shown,
        vec![Event::DisplayWakeUp, Event::EncoderRotation(3)]
    );
}

#[test]
fn console_commands() {
    let channel = EventChannel::new();
    let mut coordinator = coordinator(&channel, &[], true, SystemConfig::default());
    cycle_at(&mut coordinator, 4000);
    cycle_at(&mut coordinator, 6500);

    match coordinator.execute(ConsoleCommand::Status) {
        ConsoleReply::Status(status) => {
            assert_eq!(status.state, SystemState::Running);
            assert_eq!(status.uptime_ms, 6500);
            assert_eq!(status.time_in_state_ms, 2500);
            assert_eq!(status.cycles, 2);
            assert_eq!(status.network, Some(NetworkState::Disconnected));
        }
        other => panic!("unexpected reply {:?}", other),
    }
    assert_eq!(coordinator.execute(ConsoleCommand::Reboot), ConsoleReply::RebootRequested);
    assert_eq!(coordinator.execute(ConsoleCommand::Help), ConsoleReply::Help);
    assert_eq!(coordinator.execute(ConsoleCommand::Unknown), ConsoleReply::Unknown);
}
