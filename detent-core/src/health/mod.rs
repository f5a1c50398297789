//! Health supervision
//!
//! Periodic resource sampling and targeted restarts of worker contexts.

pub mod monitor;

pub use monitor::{ContextHealth, CoordinatorStats, HealthMonitor, HealthReport, MAX_MONITORED_CONTEXTS};
