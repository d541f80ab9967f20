//! Single-slot handoff between reassembler and presenter

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::buffer::{FrameView, HANDOFF_CAPACITY};

/// What happens to a frame that arrives while the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackpressurePolicy {
    /// Keep the queued frame, reject the new one
    #[default]
    DropNewest,
}

/// Bounded queue of [`FrameView`]s with room for exactly one entry
///
/// The producer never waits: [`try_send`](Self::try_send) either takes the
/// view or hands it straight back.
pub struct HandoffQueue<M: RawMutex> {
    channel: Channel<M, FrameView, HANDOFF_CAPACITY>,
}

impl<M: RawMutex> Default for HandoffQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> HandoffQueue<M> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    pub const fn policy(&self) -> BackpressurePolicy {
        BackpressurePolicy::DropNewest
    }

    /// Enqueue if the slot is empty, otherwise return the rejected view
    pub fn try_send(&self, view: FrameView) -> Result<(), FrameView> {
        self.channel.try_send(view).map_err(|err| match err {
            TrySendError::Full(view) => view,
        })
    }

    /// Wait for the next view
    pub async fn receive(&self) -> FrameView {
        self.channel.receive().await
    }

    pub fn try_receive(&self) -> Option<FrameView> {
        self.channel.try_receive().ok()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
