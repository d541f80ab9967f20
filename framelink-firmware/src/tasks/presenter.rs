//! Decode-and-present task
//!
//! Runs on the highest-priority interrupt executor so a queued frame is
//! picked up as soon as it is complete.

use defmt::*;
use embassy_time::TICK_HZ;

use framelink_core::pipeline::PresentOutcome;

use crate::board::Presenter;

#[embassy_executor::task]
pub async fn presenter_task(mut presenter: Presenter) -> ! {
    info!("Presenter task started");

    loop {
        let event = presenter.present_next().await;
        let view = event.view;

        match event.outcome {
            PresentOutcome::Presented { framebuffer } => {
                trace!("Frame {} on screen from buffer {}", view.sequence, framebuffer);
            }
            PresentOutcome::DecodeFailed(e) => {
                debug!("Frame {} failed to decode: {:?}", view.sequence, e);
            }
            PresentOutcome::FlushFailed(e) => {
                warn!("Frame {} flush failed: {:?}", view.sequence, e);
            }
            PresentOutcome::SlotUnavailable(e) => {
                warn!("Frame {} buffer unavailable: {:?}", view.sequence, e);
            }
        }

        if let Some(report) = event.fps {
            info!("{} fps ({:?})", report.per_second(TICK_HZ), presenter.stats());
        }
    }
}
