//! Duplex event channel between the render and coordination contexts
//!
//! Two independent bounded FIFO queues, one per direction. This is the only
//! construct shared between the two execution contexts.
//!
//! Full queues reject the newest event. The producer learns about it through
//! the `bool` returned by the send, and the rejection is counted so that the
//! health report can show it. Already queued events are never reordered or
//! dropped.

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};
use portable_atomic::{AtomicU32, Ordering};

use crate::event::Event;

/// Default queue depth per direction
pub const DEFAULT_CAPACITY: usize = 32;

/// Snapshot of one queue direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueStatus {
    /// Events currently queued
    pub depth: usize,
    /// Maximum queue depth
    pub capacity: usize,
    /// Events accepted since start
    pub accepted: u32,
    /// Events rejected because the queue was full
    pub rejected: u32,
}

/// Snapshot of both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStatus {
    /// Render -> coordination
    pub to_coordination: QueueStatus,
    /// Coordination -> render
    pub to_render: QueueStatus,
}

/// One direction of the channel with its counters
struct Queue<M: RawMutex, const N: usize> {
    events: Channel<M, Event, N>,
    accepted: AtomicU32,
    rejected: AtomicU32,
}

impl<M: RawMutex, const N: usize> Queue<M, N> {
    const fn new() -> Self {
        Self {
            events: Channel::new(),
            accepted: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
        }
    }

    fn send(&self, event: Event) -> bool {
        match self.events.try_send(event) {
            Ok(()) => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    fn try_receive(&self) -> Option<Event> {
        self.events.try_receive().ok()
    }

    async fn receive(&self, timeout: Duration) -> Option<Event> {
        if timeout.as_ticks() == 0 {
            return self.try_receive();
        }
        with_timeout(timeout, self.events.receive()).await.ok()
    }

    fn status(&self) -> QueueStatus {
        QueueStatus {
            depth: self.events.len(),
            capacity: N,
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Bounded duplex event channel
///
/// Construct once before either context starts and hand the same reference
/// to both context entry points.
pub struct EventChannel<M: RawMutex = CriticalSectionRawMutex, const N: usize = DEFAULT_CAPACITY> {
    to_coordination: Queue<M, N>,
    to_render: Queue<M, N>,
}

impl<M: RawMutex, const N: usize> Default for EventChannel<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> EventChannel<M, N> {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            to_coordination: Queue::new(),
            to_render: Queue::new(),
        }
    }

    /// Queue an event for the coordination context
    ///
    /// Returns `false` if the queue is full; the event is dropped.
    pub fn send_to_coordination(&self, event: Event) -> bool {
        self.to_coordination.send(event)
    }

    /// Queue an event for the render context
    ///
    /// Returns `false` if the queue is full; the event is dropped.
    pub fn send_to_render(&self, event: Event) -> bool {
        self.to_render.send(event)
    }

    /// Wait up to `timeout` for the next event sent by the render context
    ///
    /// A zero timeout polls without waiting.
    pub async fn receive_from_render(&self, timeout: Duration) -> Option<Event> {
        self.to_coordination.receive(timeout).await
    }

    /// Wait up to `timeout` for the next event sent by the coordination context
    ///
    /// A zero timeout polls without waiting.
    pub async fn receive_from_coordination(&self, timeout: Duration) -> Option<Event> {
        self.to_render.receive(timeout).await
    }

    /// Poll for the next event sent by the render context
    pub fn try_receive_from_render(&self) -> Option<Event> {
        self.to_coordination.try_receive()
    }

    /// Poll for the next event sent by the coordination context
    pub fn try_receive_from_coordination(&self) -> Option<Event> {
        self.to_render.try_receive()
    }

    /// Current queue depths and counters
    pub fn status(&self) -> ChannelStatus {
        ChannelStatus {
            to_coordination: self.to_coordination.status(),
            to_render: self.to_render.status(),
        }
    }

    /// Log queue depths and counters
    ///
    /// Observability only. Without the `defmt` feature this does nothing.
    pub fn log_status(&self) {
        #[cfg(feature = "defmt")]
        {
            let status = self.status();
            defmt::info!(
                "EventChannel: to_coord {}/{} (ok {}, rejected {}), to_render {}/{} (ok {}, rejected {})",
                status.to_coordination.depth,
                status.to_coordination.capacity,
                status.to_coordination.accepted,
                status.to_coordination.rejected,
                status.to_render.depth,
                status.to_render.capacity,
                status.to_render.accepted,
                status.to_render.rejected,
            );
        }
    }
}
