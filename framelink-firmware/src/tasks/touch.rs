//! Touch sampling and reporting tasks
//!
//! Sampling runs on core 1 so I2C traffic never competes with the frame
//! path; the latest point is forwarded to the host from core 0.

use defmt::*;
use embassy_usb::driver::EndpointError;

use framelink_core::touch::TouchEvent;
use framelink_hal_rp2040::usb::send_touch_report;
use framelink_protocol::TouchReport;

use crate::board::{Sampler, UsbIn};
use crate::channels::TOUCH_SLOT;

/// Wait for touch interrupts and publish the latest point
#[embassy_executor::task]
pub async fn touch_task(mut sampler: Sampler) -> ! {
    info!("Touch task started on core 1");

    loop {
        match sampler.sample().await {
            TouchEvent::Touched(point) => {
                trace!("Touch at ({}, {})", point.x, point.y);
                TOUCH_SLOT.publish(point);
            }
            TouchEvent::Released => {}
            TouchEvent::InterruptFailed(e) | TouchEvent::ReadFailed(e) => {
                let stats = sampler.stats();
                warn!(
                    "Touch controller error: {:?} ({} failures in {} samples)",
                    e, stats.failures, stats.samples
                );
            }
        }
    }
}

/// Send each published touch point to the host on the bulk IN endpoint
#[embassy_executor::task]
pub async fn touch_report_task(mut ep_in: UsbIn) -> ! {
    loop {
        let point = TOUCH_SLOT.wait().await;
        match send_touch_report(&mut ep_in, TouchReport::new(point.x, point.y)).await {
            Ok(()) => {}
            Err(EndpointError::Disabled) => debug!("Touch report dropped, host disconnected"),
            Err(e) => warn!("Touch report failed: {:?}", e),
        }
    }
}
