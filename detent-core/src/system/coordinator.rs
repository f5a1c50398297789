//! System coordinator
//!
//! Owns the device state and runs one coordination cycle at a time.
//! Every cycle does the following, in this order:
//!
//! 1. Boot timer
//! 2. Network update and edge handling
//! 3. Portal servicing while the local AP is up
//! 4. Ready -> Running
//! 5. Application update
//! 6. Drain and dispatch the events from the render context
//! 7. Health check, at most once per `health_interval_ms`
//!
//! The coordinator never blocks. The caller decides how to pace cycles.

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use heapless::Vec;

use super::network::{NetworkState, NetworkWatcher};
use super::state::{FaultKind, SystemState};
use crate::channel::{EventChannel, DEFAULT_CAPACITY};
use crate::config::SystemConfig;
use crate::console::{ConsoleCommand, ConsoleReply, StatusSnapshot};
use crate::event::Event;
use crate::health::{CoordinatorStats, HealthMonitor, HealthReport};
use crate::traits::{
    Application, Buzzer, Clock, ConfigPortal, MonitoredContext, NetworkLink, Platform, Rgb,
    StatusLed,
};

/// Transitions recorded per cycle
///
/// The longest chain in one cycle is
/// Booting -> Initializing -> WifiConnecting -> Ready -> Running.
pub const MAX_TRANSITIONS_PER_CYCLE: usize = 6;

/// Recorded state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: SystemState,
    pub to: SystemState,
    pub at_ms: u32,
}

/// Outcome of one coordination cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub transitions: Vec<Transition, MAX_TRANSITIONS_PER_CYCLE>,
    pub events_dispatched: u32,
    /// Present when a health check ran this cycle
    pub health: Option<HealthReport>,
    /// Context found not running at the end of boot
    pub stalled_context: Option<&'static str>,
}

/// Collaborators handed to the coordinator
pub struct Collaborators<P: Platform> {
    pub clock: P::Clock,
    pub network: Option<P::Network>,
    pub portal: Option<P::Portal>,
    pub led: P::Led,
    pub buzzer: P::Buzzer,
    pub app: P::App,
    pub probe: P::Probe,
}

/// Top-level device state machine
pub struct SystemCoordinator<
    'a,
    P: Platform,
    M: RawMutex = CriticalSectionRawMutex,
    const N: usize = DEFAULT_CAPACITY,
> {
    channel: &'a EventChannel<M, N>,
    contexts: &'a [&'a dyn MonitoredContext],
    clock: P::Clock,
    network: Option<P::Network>,
    portal: Option<P::Portal>,
    led: P::Led,
    buzzer: P::Buzzer,
    app: P::App,
    probe: P::Probe,

    config: SystemConfig,
    health: HealthMonitor,
    watcher: NetworkWatcher,

    state: SystemState,
    state_since: u32,
    cycles: u32,
    events_processed: u32,
    last_health_check: u32,
    transitions: Vec<Transition, MAX_TRANSITIONS_PER_CYCLE>,
}

impl<'a, P: Platform, M: RawMutex, const N: usize> SystemCoordinator<'a, P, M, N> {
    /// Create a coordinator in `Booting`
    ///
    /// `contexts` are the supervised worker contexts. They must be running
    /// by the end of the boot period.
    pub fn new(
        channel: &'a EventChannel<M, N>,
        contexts: &'a [&'a dyn MonitoredContext],
        collaborators: Collaborators<P>,
        config: SystemConfig,
    ) -> Self {
        let now = collaborators.clock.now_ms();
        Self {
            channel,
            contexts,
            clock: collaborators.clock,
            network: collaborators.network,
            portal: collaborators.portal,
            led: collaborators.led,
            buzzer: collaborators.buzzer,
            app: collaborators.app,
            probe: collaborators.probe,
            health: HealthMonitor::new(&config),
            config,
            watcher: NetworkWatcher::new(),
            state: SystemState::Booting,
            state_since: now,
            cycles: 0,
            events_processed: 0,
            last_health_check: 0,
            transitions: Vec::new(),
        }
    }

    /// One-time setup before the first cycle
    pub fn initialize(&mut self) {
        self.app.initialize();
    }

    /// Run one coordination cycle
    pub fn cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let now = self.clock.now_ms();

        if !self.state.is_error() {
            self.run_steps(now, &mut report);
        }
        self.cycles = self.cycles.wrapping_add(1);

        if !self.state.is_error() && now.wrapping_sub(self.last_health_check) > self.config.health_interval_ms {
            report.health = Some(self.check_health());
            self.last_health_check = now;
        }

        report.transitions = core::mem::take(&mut self.transitions);
        report
    }

    fn run_steps(&mut self, now: u32, report: &mut CycleReport) {
        // 1. Boot timer, measured from process start
        if self.state == SystemState::Booting && now >= self.config.boot_duration_ms {
            report.stalled_context = self.finish_boot();
        }
        if self.state.is_error() {
            return;
        }

        // 2-3. Network
        if self.state != SystemState::Booting {
            self.handle_network();
            if self.watcher.last_state() == NetworkState::LocalApMode {
                if let Some(portal) = self.portal.as_mut() {
                    portal.service();
                }
            }
        }

        // 4. Ready -> Running
        if self.state == SystemState::Ready && self.set_state(SystemState::Running) {
            self.led.set_ambient(true);
        }

        // 5. Application
        self.app.update();

        // 6. Events from the render context
        while let Some(event) = self.channel.try_receive_from_render() {
            self.dispatch(event);
            report.events_dispatched = report.events_dispatched.saturating_add(1);
        }
    }

    /// End the boot period, returning the name of a stalled context
    fn finish_boot(&mut self) -> Option<&'static str> {
        let contexts = self.contexts;
        if let Some(stalled) = contexts.iter().find(|context| !context.is_running()) {
            self.fault(FaultKind::ContextStalled);
            return Some(stalled.name());
        }

        self.set_state(SystemState::Initializing);

        if self.config.network_required {
            let Some(network) = self.network.as_mut() else {
                self.fault(FaultKind::NetworkUnavailable);
                return None;
            };
            network.begin_association();
            self.send_to_render(Event::DisplayWifiConnecting);
            self.set_state(SystemState::WifiConnecting);
        } else {
            self.send_to_render(Event::DisplayWakeUp);
            self.set_state(SystemState::Ready);
        }

        self.app.process_event(&Event::BootingComplete);
        None
    }

    fn handle_network(&mut self) {
        let Some(network) = self.network.as_mut() else {
            return;
        };
        network.update();
        let state = network.state();
        let client = network.has_local_client();

        if let Some(edge) = self.watcher.observe(state) {
            self.on_network_edge(edge);
        }

        if state == NetworkState::LocalApMode && self.watcher.observe_client(client) {
            if let Some(network) = self.network.as_ref() {
                let url = Event::wifi_setup_url(network.local_address());
                self.send_to_render(url);
            }
            self.led.flash(Rgb::GREEN, 300);
        }
    }

    fn on_network_edge(&mut self, edge: NetworkState) {
        match edge {
            NetworkState::Connecting => {
                let changed = self.set_state(SystemState::WifiConnecting);
                self.led.set_loading(true);
                self.app.process_event(&Event::WifiConnecting);
                if changed {
                    self.send_to_render(Event::DisplayWifiConnecting);
                }
            }
            NetworkState::Connected => {
                self.led.set_loading(false);
                self.led.flash(Rgb::GREEN, 500);
                self.send_to_render(Event::DisplayWakeUp);
                self.app.process_event(&Event::WifiConnected);
                self.set_state(SystemState::Ready);
            }
            NetworkState::CredentialsNotFound
            | NetworkState::Timeout
            | NetworkState::AssociationError => {
                self.app.process_event(&Event::WifiDisconnected);
                if let Some(network) = self.network.as_mut() {
                    network.fallback_to_local_ap();
                }
            }
            NetworkState::LocalApMode => {
                self.set_state(SystemState::WifiApMode);
                if let Some(portal) = self.portal.as_mut() {
                    portal.start();
                }
                if let Some(network) = self.network.as_ref() {
                    let directive = Event::wifi_ap_mode(network.network_name(), network.local_address());
                    self.send_to_render(directive);
                }
                self.led.flash(Rgb::BLUE, 1000);
            }
            NetworkState::Disconnected => {}
        }
    }

    /// Handle one event from the render context
    ///
    /// The application sees every event first. Dropped while in `Error`.
    pub fn dispatch(&mut self, event: Event) {
        if self.state.is_error() {
            return;
        }
        self.events_processed = self.events_processed.wrapping_add(1);
        self.app.process_event(&event);

        match event {
            Event::EncoderRotation(_) => {
                self.led.activate();
                self.send_to_render(event);
            }
            Event::EncoderClick => {
                self.led.flash(Rgb::GREEN, 200);
                self.buzzer.confirm();
                self.send_to_render(event);
            }
            Event::EncoderLongPress => {
                self.led.flash(Rgb::ORANGE, 500);
                self.buzzer.error();
                self.send_to_render(event);
            }
            Event::EncoderUltraLongPress
            | Event::EncoderDoubleClick
            | Event::EncoderPressAndRotate(_)
            | Event::EncoderPressTime(_)
            | Event::EncoderButtonReleased(_)
            | Event::BootingComplete
            | Event::WifiConnecting
            | Event::WifiConnected
            | Event::WifiDisconnected
            | Event::DisplayWifiConnecting
            | Event::DisplayWakeUp
            | Event::DisplayWifiApMode(_)
            | Event::DisplayWifiSetupUrl(_)
            | Event::DisplayFault => {}
        }
    }

    fn send_to_render(&self, event: Event) {
        // A full queue drops the directive; the channel counts it
        let _ = self.channel.send_to_render(event);
    }

    /// Change state, returning whether it actually changed
    ///
    /// Setting the current state again keeps its entry time.
    pub fn set_state(&mut self, state: SystemState) -> bool {
        if state == self.state {
            return false;
        }
        let now = self.clock.now_ms();
        let _ = self.transitions.push(Transition {
            from: self.state,
            to: state,
            at_ms: now,
        });
        self.state = state;
        self.state_since = now;
        true
    }

    /// Enter the terminal error state
    pub fn fault(&mut self, kind: FaultKind) {
        if self.set_state(SystemState::Error(kind)) {
            self.led.flash(Rgb::RED, 1000);
            self.send_to_render(Event::DisplayFault);
        }
    }

    fn check_health(&mut self) -> HealthReport {
        let stats = CoordinatorStats {
            cycles: self.cycles,
            events_processed: self.events_processed,
            channel: self.channel.status(),
        };
        self.channel.log_status();
        self.health.check(&self.probe, self.contexts, stats)
    }

    /// Run a console command
    pub fn execute(&mut self, command: ConsoleCommand) -> ConsoleReply {
        match command {
            ConsoleCommand::Help => ConsoleReply::Help,
            ConsoleCommand::Status => ConsoleReply::Status(self.snapshot()),
            ConsoleCommand::Reboot => ConsoleReply::RebootRequested,
            ConsoleCommand::Unknown => ConsoleReply::Unknown,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            time_in_state_ms: self.time_in_state(),
            uptime_ms: self.clock.now_ms(),
            cycles: self.cycles,
            events_processed: self.events_processed,
            network: self.network.as_ref().map(|network| network.state()),
        }
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    /// Milliseconds since the last transition
    pub fn time_in_state(&self) -> u32 {
        self.clock.elapsed_since(self.state_since)
    }

    pub fn state_since(&self) -> u32 {
        self.state_since
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn events_processed(&self) -> u32 {
        self.events_processed
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn health_monitor(&self) -> &HealthMonitor {
        &self.health
    }

    pub fn clock_mut(&mut self) -> &mut P::Clock {
        &mut self.clock
    }

    pub fn network(&self) -> Option<&P::Network> {
        self.network.as_ref()
    }

    pub fn network_mut(&mut self) -> Option<&mut P::Network> {
        self.network.as_mut()
    }

    pub fn portal(&self) -> Option<&P::Portal> {
        self.portal.as_ref()
    }

    pub fn led(&self) -> &P::Led {
        &self.led
    }

    pub fn buzzer(&self) -> &P::Buzzer {
        &self.buzzer
    }

    pub fn app(&self) -> &P::App {
        &self.app
    }
}
