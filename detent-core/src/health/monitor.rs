//! Health monitor implementation
//!
//! Samples free memory and the stack headroom of every supervised context.
//! A context whose headroom drops below the critical threshold is restarted
//! on its own; nothing else is touched.

use heapless::Vec;

use crate::channel::ChannelStatus;
use crate::config::SystemConfig;
use crate::traits::{MonitoredContext, SystemProbe};

/// Contexts reported individually in a [`HealthReport`]
pub const MAX_MONITORED_CONTEXTS: usize = 4;

/// Counters taken from the coordinator at check time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoordinatorStats {
    pub cycles: u32,
    pub events_processed: u32,
    pub channel: ChannelStatus,
}

/// Sampled state of one supervised context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContextHealth {
    pub name: &'static str,
    pub running: bool,
    /// Remaining stack in bytes, `None` if not measurable
    pub stack_margin: Option<u32>,
    /// Restart issued by this check
    pub restarted: bool,
}

/// Result of one health check
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HealthReport {
    pub free_memory: u32,
    /// Lowest free memory seen by any check so far
    pub min_free_memory: u32,
    pub context_count: u32,
    pub stats: CoordinatorStats,
    /// Per-context samples, capped at [`MAX_MONITORED_CONTEXTS`]
    pub contexts: Vec<ContextHealth, MAX_MONITORED_CONTEXTS>,
    /// Restarts issued by this check
    pub restarts: u8,
    pub low_memory: bool,
}

/// Health monitor with restart policy
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    stack_critical_bytes: u32,
    low_memory_bytes: u32,
    min_free_memory: Option<u32>,
    total_restarts: u32,
}

impl HealthMonitor {
    /// Create a monitor with thresholds from the system config
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            stack_critical_bytes: config.stack_critical_bytes,
            low_memory_bytes: config.low_memory_bytes,
            min_free_memory: None,
            total_restarts: 0,
        }
    }

    /// Sample resources and restart any context under the stack threshold
    pub fn check<P: SystemProbe + ?Sized>(
        &mut self,
        probe: &P,
        contexts: &[&dyn MonitoredContext],
        stats: CoordinatorStats,
    ) -> HealthReport {
        let free_memory = probe.free_memory();
        let min_free_memory = self
            .min_free_memory
            .map_or(free_memory, |min| min.min(free_memory));
        self.min_free_memory = Some(min_free_memory);

        let mut report = HealthReport {
            free_memory,
            min_free_memory,
            context_count: probe.context_count(),
            stats,
            contexts: Vec::new(),
            restarts: 0,
            low_memory: free_memory < self.low_memory_bytes,
        };

        for context in contexts {
            let stack_margin = context.stack_margin();
            let restarted = matches!(stack_margin, Some(margin) if margin < self.stack_critical_bytes);
            if restarted {
                context.restart();
                report.restarts = report.restarts.saturating_add(1);
                self.total_restarts = self.total_restarts.saturating_add(1);
            }

            // Contexts past the cap are still supervised, just not listed
            let _ = report.contexts.push(ContextHealth {
                name: context.name(),
                running: context.is_running(),
                stack_margin,
                restarted,
            });
        }

        report
    }

    /// Lowest free memory seen so far
    pub fn min_free_memory(&self) -> Option<u32> {
        self.min_free_memory
    }

    /// Restarts issued since creation
    pub fn total_restarts(&self) -> u32 {
        self.total_restarts
    }
}
