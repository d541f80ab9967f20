//! Decode-and-present loop
//!
//! Takes frames off the handoff queue, decodes each into the back
//! framebuffer and flips it onto the panel. A frame that fails to decode or
//! flush is skipped; the panel keeps showing the previous frame.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::buffer::{DoubleBuffer, FrameView, PoolError, ReceivePool};
use crate::config::PresenterConfig;
use crate::pipeline::fps::{FpsMeter, FpsReport};
use crate::pipeline::queue::HandoffQueue;
use crate::traits::{DecodeError, DisplayError, FrameDisplay, ImageDecoder, MonotonicTimer};

/// What happened to one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresentOutcome {
    /// Frame is on screen from the given framebuffer
    Presented { framebuffer: usize },
    DecodeFailed(DecodeError),
    FlushFailed(DisplayError),
    /// Receive buffer was not in the expected state
    SlotUnavailable(PoolError),
}

/// Result of [`FramePresenter::present`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresentEvent {
    pub view: FrameView,
    pub outcome: PresentOutcome,
    /// Set when a throughput window closed after this frame
    pub fps: Option<FpsReport>,
}

/// Running totals, never reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresenterStats {
    pub presented: u32,
    pub decode_failures: u32,
    pub flush_failures: u32,
}

/// Consumer side of the pipeline
///
/// Owned and mutated only by the presenter task.
pub struct FramePresenter<'a, M: RawMutex, Dec, Disp, T, const CAP: usize> {
    /// Shared with the reassembler; slot states arbitrate access
    pool: &'a ReceivePool<M, CAP>,
    /// Shared with the reassembler
    queue: &'a HandoffQueue<M>,
    decoder: Dec,
    display: Disp,
    timer: T,
    framebuffers: DoubleBuffer<'a>,
    fps: FpsMeter,
    stats: PresenterStats,
}

impl<'a, M, Dec, Disp, T, const CAP: usize> FramePresenter<'a, M, Dec, Disp, T, CAP>
where
    M: RawMutex,
    Dec: ImageDecoder,
    Disp: FrameDisplay,
    T: MonotonicTimer,
{
    /// Create a presenter
    ///
    /// Fails if the framebuffers are not exactly one screen in size.
    pub fn new(
        pool: &'a ReceivePool<M, CAP>,
        queue: &'a HandoffQueue<M>,
        decoder: Dec,
        display: Disp,
        timer: T,
        framebuffers: DoubleBuffer<'a>,
        config: PresenterConfig,
    ) -> Result<Self, DisplayError> {
        let expected = display.framebuffer_len();
        if framebuffers.len() != expected {
            return Err(DisplayError::SizeMismatch {
                expected,
                actual: framebuffers.len(),
            });
        }

        let window = config.report_interval_ticks(timer.ticks_per_second());
        let fps = FpsMeter::new(window, timer.now());
        Ok(Self {
            pool,
            queue,
            decoder,
            display,
            timer,
            framebuffers,
            fps,
            stats: PresenterStats::default(),
        })
    }

    pub fn stats(&self) -> PresenterStats {
        self.stats
    }

    /// Framebuffer the next frame will be decoded into
    pub fn back_index(&self) -> usize {
        self.framebuffers.back_index()
    }

    pub fn display(&self) -> &Disp {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Disp {
        &mut self.display
    }

    /// Wait for the next queued frame and present it
    pub async fn present_next(&mut self) -> PresentEvent {
        let view = self.queue.receive().await;
        self.present(view).await
    }

    /// Decode and present one frame
    pub async fn present(&mut self, view: FrameView) -> PresentEvent {
        let outcome = self.decode_and_flush(view).await;
        let fps = self.fps.sample(self.timer.now());
        PresentEvent { view, outcome, fps }
    }

    async fn decode_and_flush(&mut self, view: FrameView) -> PresentOutcome {
        // Back buffer may still be scanned out from the last flip
        self.display.wait_flip_complete().await;

        let pool = self.pool;
        let decoded = {
            let frame = match pool.claim(view) {
                Ok(frame) => frame,
                Err(e) => {
                    // A Ready slot behind a bad view would never be refilled
                    if let PoolError::ViewOutOfBounds { slot } = e {
                        let _ = pool.release(slot);
                    }
                    return PresentOutcome::SlotUnavailable(e);
                }
            };
            let result = self
                .decoder
                .decode(frame.payload(), self.framebuffers.back_mut())
                .await;
            // Receive buffer goes back to the pool before the flush
            drop(frame);
            result
        };

        if let Err(e) = decoded {
            self.stats.decode_failures += 1;
            return PresentOutcome::DecodeFailed(e);
        }

        match self.display.flush(self.framebuffers.back()).await {
            Ok(()) => {
                let framebuffer = self.framebuffers.flip();
                self.stats.presented += 1;
                self.fps.record();
                PresentOutcome::Presented { framebuffer }
            }
            Err(e) => {
                self.stats.flush_failures += 1;
                PresentOutcome::FlushFailed(e)
            }
        }
    }
}
