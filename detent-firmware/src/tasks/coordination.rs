//! Coordination task
//!
//! Owns the system coordinator on core 0. Each loop runs one cycle, then
//! waits briefly for the next render event or console command so that
//! input is handled without polling.

use cortex_m::peripheral::SCB;
use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};

use detent_core::config::SystemConfig;
use detent_core::console::ConsoleReply;
use detent_core::system::{Collaborators, CycleReport, FaultKind, SystemCoordinator};
use detent_core::traits::MonitoredContext;

use crate::board::{Board, LogApp, UptimeClock};
use crate::channels::{DeviceChannel, CONSOLE_COMMANDS, CONSOLE_REPLIES};
use crate::contexts::{task_started, StackProbe, CONSOLE_MONITOR, LED_MONITOR, RENDER_MONITOR};
use crate::feedback::{BuzzerHandle, LedHandle};

/// Longest wait for an event between cycles
const CYCLE_WAIT_MS: u64 = 20;

/// Time for the console to flush the reboot reply
const REBOOT_DELAY_MS: u64 = 100;

#[embassy_executor::task]
pub async fn coordination_task(
    channel: &'static DeviceChannel,
    config: SystemConfig,
    startup_fault: Option<FaultKind>,
) {
    info!("Coordination task started");
    task_started();

    let contexts: [&dyn MonitoredContext; 3] = [&RENDER_MONITOR, &CONSOLE_MONITOR, &LED_MONITOR];
    let collaborators = Collaborators::<Board> {
        clock: UptimeClock,
        network: None,
        portal: None,
        led: LedHandle,
        buzzer: BuzzerHandle,
        app: LogApp::default(),
        probe: StackProbe,
    };

    let mut coordinator = SystemCoordinator::new(channel, &contexts, collaborators, config);
    coordinator.initialize();
    if let Some(kind) = startup_fault {
        error!("Startup failed: {}", kind);
        coordinator.fault(kind);
    }

    loop {
        let report = coordinator.cycle();
        log_report(&report);

        let wait = channel.receive_from_render(Duration::from_millis(CYCLE_WAIT_MS));
        match select(wait, CONSOLE_COMMANDS.receive()).await {
            Either::First(Some(event)) => coordinator.dispatch(event),
            Either::First(None) => {}
            Either::Second(command) => {
                let reply = coordinator.execute(command);
                CONSOLE_REPLIES.send(reply).await;
                if reply == ConsoleReply::RebootRequested {
                    warn!("Reboot requested from console");
                    Timer::after_millis(REBOOT_DELAY_MS).await;
                    SCB::sys_reset();
                }
            }
        }
    }
}

fn log_report(report: &CycleReport) {
    for transition in &report.transitions {
        info!(
            "State {} -> {} at {} ms",
            transition.from.label(),
            transition.to.label(),
            transition.at_ms
        );
    }

    if let Some(name) = report.stalled_context {
        error!("Context '{}' not running at end of boot", name);
    }

    let Some(health) = &report.health else {
        return;
    };
    info!(
        "Health: free {} B (min {}), {} tasks, {} cycles, {} events",
        health.free_memory,
        health.min_free_memory,
        health.context_count,
        health.stats.cycles,
        health.stats.events_processed
    );
    for context in &health.contexts {
        match context.stack_margin {
            Some(margin) => debug!("  {}: running={}, stack margin {} B", context.name, context.running, margin),
            None => debug!("  {}: running={}", context.name, context.running),
        }
        if context.restarted {
            warn!("Restarted context '{}'", context.name);
        }
    }
    if health.low_memory {
        warn!("Low memory: {} B free", health.free_memory);
    }
}
