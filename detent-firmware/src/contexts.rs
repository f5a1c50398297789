//! Supervision handles for the worker contexts
//!
//! A [`ContextMonitor`] is shared between the coordinator and the task it
//! supervises. The task reports that it runs and polls for restart
//! requests; the coordinator reads the flags and the stack probe.

use embassy_rp::multicore::Stack;
use portable_atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use detent_core::traits::{MonitoredContext, SystemProbe};

/// Byte written over a stack before its context starts
const STACK_PAINT: u8 = 0xC5;

/// Render/input context on core 1
pub static RENDER_MONITOR: ContextMonitor = ContextMonitor::new("render");

/// Serial console on core 0
pub static CONSOLE_MONITOR: ContextMonitor = ContextMonitor::new("console");

/// Status LED animations on core 0
pub static LED_MONITOR: ContextMonitor = ContextMonitor::new("led");

/// Bytes below the core 0 stack pointer left unpainted for the painting call
const CORE0_PAINT_GUARD: usize = 1024;

/// Number of tasks that have started
static TASKS_STARTED: AtomicU32 = AtomicU32::new(0);

/// Record a task start for [`StackProbe::context_count`]
pub fn task_started() {
    TASKS_STARTED.fetch_add(1, Ordering::Relaxed);
}

/// Shared handle to a supervised task
pub struct ContextMonitor {
    name: &'static str,
    running: AtomicBool,
    restart_requested: AtomicBool,
    restarts: AtomicU32,
    stack_base: AtomicUsize,
    stack_len: AtomicUsize,
}

impl ContextMonitor {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            running: AtomicBool::new(false),
            restart_requested: AtomicBool::new(false),
            restarts: AtomicU32::new(0),
            stack_base: AtomicUsize::new(0),
            stack_len: AtomicUsize::new(0),
        }
    }

    /// Called by the task once it is up
    pub fn set_running(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Called by the task between iterations; returns a pending restart
    pub fn take_restart(&self) -> bool {
        self.restart_requested.swap(false, Ordering::AcqRel)
    }

    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Paint a core stack and watch its high-water mark
    ///
    /// Must run before the core using the stack is started.
    pub fn watch_stack<const SIZE: usize>(&self, stack: &mut Stack<SIZE>) {
        let base = core::ptr::from_mut(stack).cast::<u8>();
        // SAFETY: we hold the only reference to the stack and the core using
        // it has not been started yet.
        unsafe { core::ptr::write_bytes(base, STACK_PAINT, SIZE) };
        self.watch_region(base as usize, SIZE);
    }

    fn watch_region(&self, base: usize, len: usize) {
        self.stack_len.store(len, Ordering::Relaxed);
        self.stack_base.store(base, Ordering::Release);
    }
}

/// Paint the unused core 0 stack and watch it from every monitor given
///
/// Tasks on the core 0 executor share that stack, so they share one
/// high-water mark. Must run from `main` before the executor starts.
pub fn watch_core0_stack(monitors: &[&ContextMonitor]) {
    let sp = cortex_m::register::msp::read() as usize;
    // SAFETY: only the address of the linker symbol is taken.
    let base = unsafe { core::ptr::addr_of!(__sheap) } as usize;
    let len = sp.saturating_sub(CORE0_PAINT_GUARD).saturating_sub(base);
    // SAFETY: the range runs from the end of static data to below the live
    // stack frames and nothing is allocated in it.
    unsafe { core::ptr::write_bytes(base as *mut u8, STACK_PAINT, len) };
    for monitor in monitors {
        monitor.watch_region(base, len);
    }
}

impl MonitoredContext for ContextMonitor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn stack_margin(&self) -> Option<u32> {
        let base = self.stack_base.load(Ordering::Acquire);
        if base == 0 {
            return None;
        }
        let len = self.stack_len.load(Ordering::Relaxed);

        // The stack grows down, so untouched paint sits at the low end
        let untouched = (0..len)
            .take_while(|offset| {
                // SAFETY: the range was painted by `watch_stack` or
                // `watch_core0_stack` and stays reserved for the whole program.
                let byte = unsafe { core::ptr::read_volatile((base + offset) as *const u8) };
                byte == STACK_PAINT
            })
            .count();
        Some(untouched as u32)
    }

    fn restart(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
        self.restart_requested.store(true, Ordering::Release);
    }
}

/// Memory and task sampling for the health check
pub struct StackProbe;

extern "C" {
    /// End of static data, placed by the cortex-m-rt linker script
    static __sheap: u8;
}

impl SystemProbe for StackProbe {
    /// Bytes between the end of static data and the core 0 stack pointer
    fn free_memory(&self) -> u32 {
        let sp = cortex_m::register::msp::read();
        // SAFETY: only the address of the linker symbol is taken.
        let heap_start = unsafe { core::ptr::addr_of!(__sheap) } as u32;
        sp.saturating_sub(heap_start)
    }

    fn context_count(&self) -> u32 {
        TASKS_STARTED.load(Ordering::Relaxed)
    }
}
