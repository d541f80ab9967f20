//! Frame reassembly from the USB byte stream
//!
//! The reassembler drains the vendor channel into the current receive
//! buffer, one length-prefixed frame at a time:
//!
//! ```text
//! AwaitingMount -> ScanningHeader -> AccumulatingPayload -> Delivering
//!       ^               ^   |                 |                  |
//!       |               |   +-- rejected -----+-- aborted -------+
//!       +-- unmounted --+---------------------+------------------+
//! ```
//!
//! A header whose length exceeds the receive buffer is rejected, but its
//! payload is still read and thrown away so the next header lines up.
//!
//! A completed frame is offered to the handoff queue without waiting. The
//! buffer index only advances when the queue takes the frame; a dropped
//! frame's buffer is reused for the next one.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;
use framelink_protocol::{FrameHeader, HeaderError, FRAME_HEADER_LEN};

use crate::buffer::{FrameCursor, FrameView, PoolError, ReceivePool, RECEIVE_BUFFER_COUNT};
use crate::config::ReassemblerConfig;
use crate::pipeline::queue::HandoffQueue;
use crate::traits::VendorChannel;

/// Where the reassembler is in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReassemblerState {
    /// Host not connected
    AwaitingMount,
    /// Waiting for or reading a length header
    ScanningHeader,
    /// Header accepted, reading payload bytes
    AccumulatingPayload,
    /// Oversized frame rejected, skipping its payload
    Discarding,
    /// Frame complete, being offered to the queue
    Delivering,
}

/// Why a partially received frame was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortReason {
    /// No data arrived within the backoff budget
    Stalled { received: usize, expected: usize },
    /// Host disconnected mid-frame
    Unmounted { received: usize, expected: usize },
    /// Channel reported more bytes than it was asked for
    Overrun { received: usize, expected: usize },
}

/// Outcome of one [`FrameReassembler::next_event`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReassemblerEvent {
    /// Host connected (`true`) or disconnected (`false`)
    MountChanged(bool),
    /// Still disconnected; slept for the unmounted poll interval
    Unmounted,
    /// Connected but not enough data for a header; slept briefly
    Idle,
    /// Frame queued for the presenter
    Delivered(FrameView),
    /// Frame complete but the queue was full
    Dropped(FrameView),
    /// Partial frame discarded
    Aborted { slot: usize, reason: AbortReason },
    /// Length header rejected
    Rejected(HeaderError),
    /// Current receive buffer could not be taken
    SlotBusy(PoolError),
}

/// Running totals, never reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReassemblerStats {
    pub delivered: u32,
    pub dropped: u32,
    pub aborted: u32,
    pub rejected: u32,
}

/// Producer side of the pipeline
///
/// Owned and mutated only by the reassembler task.
pub struct FrameReassembler<'a, M: RawMutex, C, D, const CAP: usize> {
    /// USB receive channel
    channel: C,
    /// Backoff and idle sleeps
    delay: D,
    /// Shared with the presenter; slot states arbitrate access
    pool: &'a ReceivePool<M, CAP>,
    /// Shared with the presenter
    queue: &'a HandoffQueue<M>,
    config: ReassemblerConfig,
    /// Receive buffer the next frame is written into
    slot: usize,
    /// Mount state as last reported
    mounted: bool,
    /// Sequence number for the next frame
    sequence: u32,
    state: ReassemblerState,
    stats: ReassemblerStats,
}

impl<'a, M, C, D, const CAP: usize> FrameReassembler<'a, M, C, D, CAP>
where
    M: RawMutex,
    C: VendorChannel,
    D: DelayNs,
{
    pub fn new(
        channel: C,
        delay: D,
        pool: &'a ReceivePool<M, CAP>,
        queue: &'a HandoffQueue<M>,
        config: ReassemblerConfig,
    ) -> Self {
        Self {
            channel,
            delay,
            pool,
            queue,
            config,
            slot: 0,
            mounted: false,
            sequence: 0,
            state: ReassemblerState::AwaitingMount,
            stats: ReassemblerStats::default(),
        }
    }

    pub fn current_slot(&self) -> usize {
        self.slot
    }

    pub fn state(&self) -> ReassemblerState {
        self.state
    }

    pub fn stats(&self) -> ReassemblerStats {
        self.stats
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Run until something worth reporting happens
    ///
    /// Every path through this call is bounded: it sleeps at most one poll
    /// interval when idle, and at most the stall budget per gap in a frame.
    pub async fn next_event(&mut self) -> ReassemblerEvent {
        let mounted = self.channel.is_mounted();
        if mounted != self.mounted {
            self.mounted = mounted;
            self.state = if mounted {
                ReassemblerState::ScanningHeader
            } else {
                ReassemblerState::AwaitingMount
            };
            return ReassemblerEvent::MountChanged(mounted);
        }

        if !mounted {
            self.delay.delay_ms(self.config.unmounted_poll_ms).await;
            return ReassemblerEvent::Unmounted;
        }

        self.state = ReassemblerState::ScanningHeader;
        if self.channel.available() < self.config.min_header_bytes {
            self.delay.delay_us(self.config.idle_poll_us).await;
            return ReassemblerEvent::Idle;
        }

        let event = self.receive_frame().await;
        self.state = ReassemblerState::ScanningHeader;
        event
    }

    async fn receive_frame(&mut self) -> ReassemblerEvent {
        let pool = self.pool;
        let slot = self.slot;
        let mut fill = match pool.fill(slot) {
            Ok(fill) => fill,
            Err(e) => {
                self.delay.delay_us(self.config.idle_poll_us).await;
                return ReassemblerEvent::SlotBusy(e);
            }
        };

        let payload_len = {
            let mut cursor = FrameCursor::new(fill.data_mut());

            if let Err(reason) = self.read_until(&mut cursor, FRAME_HEADER_LEN).await {
                self.stats.aborted += 1;
                return ReassemblerEvent::Aborted { slot, reason };
            }

            let header = match FrameHeader::parse(cursor.filled_bytes())
                .and_then(|h| h.validate(CAP).map(|()| h))
            {
                Ok(header) => header,
                Err(e) => {
                    self.stats.rejected += 1;
                    if let HeaderError::TooLarge { total_len, .. } = e {
                        self.state = ReassemblerState::Discarding;
                        let skip = (total_len as usize).saturating_sub(FRAME_HEADER_LEN);
                        if let Err(reason) = self.discard(&mut cursor, skip).await {
                            self.stats.aborted += 1;
                            return ReassemblerEvent::Aborted { slot, reason };
                        }
                    }
                    return ReassemblerEvent::Rejected(e);
                }
            };

            self.state = ReassemblerState::AccumulatingPayload;
            if let Err(reason) = self.read_until(&mut cursor, header.total_len()).await {
                self.stats.aborted += 1;
                return ReassemblerEvent::Aborted { slot, reason };
            }
            header.payload_len()
        };

        self.state = ReassemblerState::Delivering;
        fill.commit();

        let view = FrameView {
            slot,
            offset: FRAME_HEADER_LEN,
            len: payload_len,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);

        match self.queue.try_send(view) {
            Ok(()) => {
                self.slot = (slot + 1) % RECEIVE_BUFFER_COUNT;
                self.stats.delivered += 1;
                ReassemblerEvent::Delivered(view)
            }
            Err(view) => {
                // Committed above, so the slot is Ready
                let released = pool.release(slot);
                debug_assert_eq!(released, Ok(()));
                self.stats.dropped += 1;
                ReassemblerEvent::Dropped(view)
            }
        }
    }

    /// Read until `cursor` holds `target` bytes
    ///
    /// Each stretch of empty polls is bounded by the stall policy; the count
    /// restarts whenever bytes arrive.
    async fn read_until(
        &mut self,
        cursor: &mut FrameCursor<'_>,
        target: usize,
    ) -> Result<(), AbortReason> {
        let stall = self.config.stall;
        let mut attempts = 0u32;

        while cursor.filled() < target {
            let received = cursor.filled();
            if !self.channel.is_mounted() {
                return Err(AbortReason::Unmounted {
                    received,
                    expected: target,
                });
            }

            let want = (target - received)
                .min(self.channel.available())
                .min(self.config.chunk_size);
            let read = if want == 0 {
                0
            } else {
                self.channel.read(cursor.spare_mut(want))
            };
            if read > want {
                return Err(AbortReason::Overrun {
                    received,
                    expected: target,
                });
            }

            if read == 0 {
                if attempts >= stall.max_attempts {
                    return Err(AbortReason::Stalled {
                        received,
                        expected: target,
                    });
                }
                attempts += 1;
                self.delay.delay_us(stall.delay_us).await;
                continue;
            }

            cursor.advance(read).map_err(|_| AbortReason::Overrun {
                received,
                expected: target,
            })?;
            attempts = 0;
        }
        Ok(())
    }

    /// Read and drop `len` bytes, using `scratch` as the landing area
    ///
    /// Same stall policy as [`read_until`](Self::read_until); abort
    /// positions are reported relative to the skipped span.
    async fn discard(
        &mut self,
        scratch: &mut FrameCursor<'_>,
        len: usize,
    ) -> Result<(), AbortReason> {
        let mut skipped = 0;
        while skipped < len {
            scratch.reset();
            let step = (len - skipped).min(scratch.capacity());
            if let Err(reason) = self.read_until(scratch, step).await {
                return Err(reason.shifted(skipped, len));
            }
            skipped += step;
        }
        scratch.reset();
        Ok(())
    }
}

impl AbortReason {
    /// Rebase a partial read at `base` into a span of `expected` bytes
    fn shifted(self, base: usize, expected: usize) -> Self {
        match self {
            Self::Stalled { received, .. } => Self::Stalled {
                received: base + received,
                expected,
            },
            Self::Unmounted { received, .. } => Self::Unmounted {
                received: base + received,
                expected,
            },
            Self::Overrun { received, .. } => Self::Overrun {
                received: base + received,
                expected,
            },
        }
    }
}
