//! Monotonic time source

/// Milliseconds since boot
///
/// The value wraps after roughly 49 days. Consumers compare timestamps with
/// `wrapping_sub`, so a wrap is harmless as long as the compared spans stay
/// below that range.
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `earlier`
    fn elapsed_since(&self, earlier: u32) -> u32 {
        self.now_ms().wrapping_sub(earlier)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
