//! Interrupt-driven touch sampler

use embedded_hal_async::delay::DelayNs;

use crate::config::TouchConfig;
use crate::traits::{TouchController, TouchError, TouchPoint};

/// Outcome of one sampling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchEvent {
    Touched(TouchPoint),
    /// Interrupt fired but no finger is down
    Released,
    /// Waiting for the interrupt failed; slept the retry delay
    InterruptFailed(TouchError),
    /// Reading coordinates failed; slept the retry delay
    ReadFailed(TouchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchStats {
    pub samples: u32,
    pub failures: u32,
}

/// Touch task state, owned by the touch task
pub struct TouchSampler<T, D> {
    touch: T,
    delay: D,
    config: TouchConfig,
    stats: TouchStats,
}

impl<T: TouchController, D: DelayNs> TouchSampler<T, D> {
    pub fn new(touch: T, delay: D, config: TouchConfig) -> Self {
        Self {
            touch,
            delay,
            config,
            stats: TouchStats::default(),
        }
    }

    pub fn stats(&self) -> TouchStats {
        self.stats
    }

    /// Wait for the next interrupt and read the touch point
    ///
    /// Failures skip the cycle after a short pause; they never end the loop.
    pub async fn sample(&mut self) -> TouchEvent {
        if let Err(e) = self.touch.wait_interrupt().await {
            self.fail().await;
            return TouchEvent::InterruptFailed(e);
        }

        match self.touch.read_point().await {
            Ok(Some(point)) => {
                self.stats.samples += 1;
                TouchEvent::Touched(point)
            }
            Ok(None) => TouchEvent::Released,
            Err(e) => {
                self.fail().await;
                TouchEvent::ReadFailed(e)
            }
        }
    }

    async fn fail(&mut self) {
        self.stats.failures += 1;
        self.delay.delay_ms(self.config.retry_delay_ms).await;
    }
}
