//! Latest-value touch handoff

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use crate::traits::TouchPoint;

/// Holds the most recent touch point
///
/// Publishing overwrites any point not yet taken, so a slow consumer sees
/// the newest position rather than a backlog.
pub struct TouchSlot<M: RawMutex> {
    latest: Signal<M, TouchPoint>,
}

impl<M: RawMutex> Default for TouchSlot<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> TouchSlot<M> {
    pub const fn new() -> Self {
        Self {
            latest: Signal::new(),
        }
    }

    pub fn publish(&self, point: TouchPoint) {
        self.latest.signal(point);
    }

    /// Wait for a point and take it
    pub async fn wait(&self) -> TouchPoint {
        self.latest.wait().await
    }

    pub fn try_take(&self) -> Option<TouchPoint> {
        self.latest.try_take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_publish_overwrites() {
        let slot = TouchSlot::<NoopRawMutex>::new();
        slot.publish(TouchPoint::new(1, 1));
        slot.publish(TouchPoint::new(2, 3));
        assert_eq!(block_on(slot.wait()), TouchPoint::new(2, 3));
        assert_eq!(slot.try_take(), None);
    }
}
