//! Monotonic time source backed by the embassy time driver

use embassy_time::{Instant, TICK_HZ};
use framelink_core::traits::MonotonicTimer;

/// Reads the embassy-time tick counter (the RP2040 1 MHz timer)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyTimer;

impl MonotonicTimer for EmbassyTimer {
    fn now(&self) -> u64 {
        Instant::now().as_ticks()
    }

    fn ticks_per_second(&self) -> u64 {
        TICK_HZ
    }
}
