//! Supervised execution contexts and system probes

/// Handle to an execution context under health supervision
///
/// Methods take `&self`: the handle is shared with the context it controls,
/// so implementations use atomics.
pub trait MonitoredContext {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Check if the context has started and is still alive
    fn is_running(&self) -> bool;

    /// Remaining stack headroom in bytes, `None` if not measurable
    fn stack_margin(&self) -> Option<u32>;

    /// Discard the context's local state and reinitialize it
    fn restart(&self);
}

/// Process-wide resource sampling
pub trait SystemProbe {
    /// Free memory in bytes
    fn free_memory(&self) -> u32;

    /// Number of execution contexts (tasks) currently alive
    fn context_count(&self) -> u32;
}
