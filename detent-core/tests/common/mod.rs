//! Test collaborators shared by the integration tests
#![allow(dead_code)]

use std::cell::Cell;

use detent_core::config::SystemConfig;
use detent_core::system::{Collaborators, NetworkState, SystemCoordinator};
use detent_core::traits::{
    Application, Buzzer, Clock, ConfigPortal, EncoderHardware, MonitoredContext, NetworkLink,
    Platform, RenderTarget, Rgb, StatusLed, SystemProbe,
};
use detent_core::{Event, EventChannel};

pub const AP_NAME: &str = "detent-setup";
pub const AP_ADDRESS: &str = "192.168.4.1";

#[derive(Debug, Default)]
pub struct TestClock(pub u32);

impl Clock for TestClock {
    fn now_ms(&self) -> u32 {
        self.0
    }
}

/// Network that moves to Connecting on association and to the AP on fallback
#[derive(Debug, Default)]
pub struct TestNetwork {
    pub state: NetworkState,
    pub client: bool,
    pub updates: u32,
    pub associations: u32,
    pub fallbacks: u32,
}

impl NetworkLink for TestNetwork {
    fn update(&mut self) {
        self.updates += 1;
    }

    fn begin_association(&mut self) {
        self.associations += 1;
        self.state = NetworkState::Connecting;
    }

    fn fallback_to_local_ap(&mut self) {
        self.fallbacks += 1;
        self.state = NetworkState::LocalApMode;
    }

    fn state(&self) -> NetworkState {
        self.state
    }

    fn has_local_client(&self) -> bool {
        self.client
    }

    fn local_address(&self) -> &str {
        AP_ADDRESS
    }

    fn network_name(&self) -> &str {
        AP_NAME
    }
}

#[derive(Debug, Default)]
pub struct TestPortal {
    pub starts: u32,
    pub services: u32,
}

impl ConfigPortal for TestPortal {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn service(&mut self) {
        self.services += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCall {
    Flash(Rgb, u16),
    Loading(bool),
    Activate,
    Ambient(bool),
}

#[derive(Debug, Default)]
pub struct TestLed {
    pub calls: Vec<LedCall>,
}

impl StatusLed for TestLed {
    fn flash(&mut self, color: Rgb, duration_ms: u16) {
        self.calls.push(LedCall::Flash(color, duration_ms));
    }

    fn set_loading(&mut self, on: bool) {
        self.calls.push(LedCall::Loading(on));
    }

    fn activate(&mut self) {
        self.calls.push(LedCall::Activate);
    }

    fn set_ambient(&mut self, on: bool) {
        self.calls.push(LedCall::Ambient(on));
    }
}

#[derive(Debug, Default)]
pub struct TestBuzzer {
    pub confirms: u32,
    pub errors: u32,
}

impl Buzzer for TestBuzzer {
    fn confirm(&mut self) {
        self.confirms += 1;
    }

    fn error(&mut self) {
        self.errors += 1;
    }
}

#[derive(Debug, Default)]
pub struct TestApp {
    pub initialized: bool,
    pub updates: u32,
    pub events: Vec<Event>,
}

impl Application for TestApp {
    fn initialize(&mut self) {
        self.initialized = true;
    }

    fn update(&mut self) {
        self.updates += 1;
    }

    fn process_event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

#[derive(Debug)]
pub struct TestProbe {
    pub free: u32,
}

impl SystemProbe for TestProbe {
    fn free_memory(&self) -> u32 {
        self.free
    }

    fn context_count(&self) -> u32 {
        4
    }
}

pub struct TestContext {
    pub name: &'static str,
    pub running: Cell<bool>,
    pub margin: Cell<Option<u32>>,
    pub restarts: Cell<u32>,
}

impl TestContext {
    pub fn new(name: &'static str, margin: Option<u32>) -> Self {
        Self {
            name,
            running: Cell::new(true),
            margin: Cell::new(margin),
            restarts: Cell::new(0),
        }
    }
}

impl MonitoredContext for TestContext {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }

    fn stack_margin(&self) -> Option<u32> {
        self.margin.get()
    }

    fn restart(&self) {
        self.restarts.set(self.restarts.get() + 1);
    }
}

pub struct TestPlatform;

impl Platform for TestPlatform {
    type Clock = TestClock;
    type Network = TestNetwork;
    type Portal = TestPortal;
    type Led = TestLed;
    type Buzzer = TestBuzzer;
    type App = TestApp;
    type Probe = TestProbe;
}

pub type Coordinator<'a> = SystemCoordinator<'a, TestPlatform>;

pub fn coordinator<'a>(
    channel: &'a EventChannel,
    contexts: &'a [&'a dyn MonitoredContext],
    with_network: bool,
    config: SystemConfig,
) -> Coordinator<'a> {
    let collaborators = Collaborators {
        clock: TestClock(0),
        network: with_network.then(TestNetwork::default),
        portal: with_network.then(TestPortal::default),
        led: TestLed::default(),
        buzzer: TestBuzzer::default(),
        app: TestApp::default(),
        probe: TestProbe { free: 64 * 1024 },
    };
    let mut coordinator = SystemCoordinator::new(channel, contexts, collaborators, config);
    coordinator.initialize();
    coordinator
}

/// Run one cycle at time `at_ms`
pub fn cycle_at(
    coordinator: &mut Coordinator<'_>,
    at_ms: u32,
) -> detent_core::system::CycleReport {
    coordinator.clock_mut().0 = at_ms;
    coordinator.cycle()
}

/// Run cycles every 50 ms from the current time up to and including `until_ms`
pub fn run_until(coordinator: &mut Coordinator<'_>, until_ms: u32) -> Vec<detent_core::system::CycleReport> {
    let mut reports = Vec::new();
    let mut now = coordinator.clock_mut().0;
    while now < until_ms {
        now = (now + 50).min(until_ms);
        reports.push(cycle_at(coordinator, now));
    }
    reports
}

/// Everything queued for the render context
pub fn drain_render(channel: &EventChannel) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(event) = channel.try_receive_from_coordination() {
        events.push(event);
    }
    events
}

#[derive(Debug, Default)]
pub struct TestEncoder {
    pub position: i32,
    pub pressed: bool,
}

impl EncoderHardware for TestEncoder {
    fn position(&mut self) -> i32 {
        self.position
    }

    fn button_pressed(&mut self) -> bool {
        self.pressed
    }
}

#[derive(Debug, Default)]
pub struct TestDisplay {
    pub shown: Vec<Event>,
    pub frames: u32,
}

impl RenderTarget for TestDisplay {
    fn show(&mut self, event: &Event) {
        self.shown.push(event.clone());
    }

    fn update(&mut self) {
        self.frames += 1;
    }

    fn reset(&mut self) {
        self.shown.clear();
    }
}
