//! Frame reassembly task
//!
//! Drains the USB pipe into receive buffers and hands complete frames to
//! the presenter. Runs on the medium-priority interrupt executor.

use defmt::*;

use framelink_core::pipeline::ReassemblerEvent;

use crate::board::Reassembler;
use crate::channels::USB_RX_PIPE;

#[embassy_executor::task]
pub async fn reassembler_task(mut reassembler: Reassembler) -> ! {
    info!("Reassembler task started");

    loop {
        match reassembler.next_event().await {
            ReassemblerEvent::MountChanged(true) => {
                info!("USB host connected");
            }
            ReassemblerEvent::MountChanged(false) => {
                // Wakes the pump if it is blocked on a full pipe
                USB_RX_PIPE.clear();
                info!("USB host disconnected ({:?})", reassembler.stats());
            }
            ReassemblerEvent::Unmounted | ReassemblerEvent::Idle => {}
            ReassemblerEvent::Delivered(view) => {
                trace!(
                    "Frame {} queued: {} bytes in slot {}",
                    view.sequence,
                    view.len,
                    view.slot
                );
            }
            ReassemblerEvent::Dropped(view) => {
                warn!("Presenter busy, dropped frame {}", view.sequence);
            }
            ReassemblerEvent::Aborted { slot, reason } => {
                warn!("Frame in slot {} aborted: {:?}", slot, reason);
            }
            ReassemblerEvent::Rejected(e) => {
                warn!("Frame header rejected: {:?}", e);
            }
            ReassemblerEvent::SlotBusy(e) => {
                warn!("Receive buffer unavailable: {:?}", e);
            }
        }
    }
}
