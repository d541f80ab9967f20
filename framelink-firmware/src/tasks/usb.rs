//! USB device and bulk OUT pump tasks

use defmt::*;
use embassy_usb::UsbDevice;

use framelink_hal_rp2040::usb::{pump_out, RpUsbDriver};

use crate::board::UsbOut;
use crate::channels::USB_RX_PIPE;

/// Run the USB device state machine
#[embassy_executor::task]
pub async fn usb_device_task(mut usb: UsbDevice<'static, RpUsbDriver>) -> ! {
    info!("USB device task started");
    usb.run().await
}

/// Copy bulk OUT data into the reassembler's pipe, one connection at a time
#[embassy_executor::task]
pub async fn usb_pump_task(mut ep_out: UsbOut) -> ! {
    loop {
        let forwarded = pump_out(&mut ep_out, &USB_RX_PIPE).await;
        debug!("Bulk OUT endpoint disabled after {} bytes", forwarded);
    }
}
