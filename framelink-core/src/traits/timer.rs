//! Monotonic time source

/// Free-running tick counter
pub trait MonotonicTimer {
    /// Current tick count; never decreases
    fn now(&self) -> u64;

    /// Tick frequency
    fn ticks_per_second(&self) -> u64;
}
