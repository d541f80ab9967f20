//! USB vendor interface
//!
//! The device exposes a single vendor-specific interface with one bulk OUT
//! endpoint (frames from the host) and one bulk IN endpoint (touch reports
//! to the host).
//!
//! The USB stack and the reassembler run on different executors, so bytes
//! cross between them through an embassy-sync [`Pipe`]:
//!
//! ```text
//! bulk OUT ──► pump_out ──► Pipe ──► PipeChannel ──► FrameReassembler
//! ```
//!
//! Mount state is tracked by [`MountHandler`], registered with the
//! embassy-usb builder, and read back through [`MountFlag`].

use embassy_rp::peripherals::USB;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::driver::{Driver, Endpoint, EndpointError, EndpointIn, EndpointOut};
use embassy_usb::{Builder, Config, Handler};
use framelink_core::traits::VendorChannel;
use framelink_protocol::{TouchReport, USB_PID, USB_VID};
use portable_atomic::{AtomicBool, Ordering};

/// Concrete driver for the RP2040 USB controller
pub type RpUsbDriver = embassy_rp::usb::Driver<'static, USB>;

/// Vendor-specific interface class
pub const VENDOR_CLASS: u8 = 0xFF;

/// Full-speed bulk packet size
pub const MAX_PACKET_SIZE: u16 = 64;

/// Device descriptor settings the host sender matches on
pub fn device_config() -> Config<'static> {
    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some("Framelink");
    config.product = Some("Framelink display");
    config.serial_number = None;
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}

/// Add the vendor interface and return its (OUT, IN) bulk endpoints
pub fn vendor_interface<'d, D: Driver<'d>>(
    builder: &mut Builder<'d, D>,
) -> (D::EndpointOut, D::EndpointIn) {
    let mut function = builder.function(VENDOR_CLASS, 0, 0);
    let mut interface = function.interface();
    let mut alt = interface.alt_setting(VENDOR_CLASS, 0, 0, None);
    let ep_out = alt.endpoint_bulk_out(None, MAX_PACKET_SIZE);
    let ep_in = alt.endpoint_bulk_in(None, MAX_PACKET_SIZE);
    (ep_out, ep_in)
}

/// Whether the host has configured the device
pub struct MountFlag {
    mounted: AtomicBool,
}

impl MountFlag {
    pub const fn new() -> Self {
        Self {
            mounted: AtomicBool::new(false),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    fn set(&self, mounted: bool) {
        self.mounted.store(mounted, Ordering::Release);
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// embassy-usb event handler that keeps a [`MountFlag`] current
pub struct MountHandler {
    flag: &'static MountFlag,
}

impl MountHandler {
    pub fn new(flag: &'static MountFlag) -> Self {
        Self { flag }
    }
}

impl Handler for MountHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.flag.set(false);
        }
    }

    fn reset(&mut self) {
        self.flag.set(false);
    }

    fn configured(&mut self, configured: bool) {
        self.flag.set(configured);
    }
}

/// [`VendorChannel`] reading from the pipe filled by [`pump_out`]
pub struct PipeChannel<'a, M: RawMutex, const N: usize> {
    pipe: &'a Pipe<M, N>,
    mount: &'a MountFlag,
}

impl<'a, M: RawMutex, const N: usize> PipeChannel<'a, M, N> {
    pub fn new(pipe: &'a Pipe<M, N>, mount: &'a MountFlag) -> Self {
        Self { pipe, mount }
    }
}

impl<M: RawMutex, const N: usize> VendorChannel for PipeChannel<'_, M, N> {
    fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    fn available(&self) -> usize {
        self.pipe.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        self.pipe.try_read(buf).unwrap_or(0)
    }
}

/// Copy bulk OUT packets into `pipe` until the endpoint is disabled
///
/// Waits for the host to enable the endpoint first. The pipe is cleared on
/// the way out so a reconnect never starts with a partial frame. Returns the
/// number of bytes forwarded during the connection.
pub async fn pump_out<E, M, const N: usize>(ep: &mut E, pipe: &Pipe<M, N>) -> usize
where
    E: EndpointOut,
    M: RawMutex,
{
    ep.wait_enabled().await;

    let mut packet = [0u8; MAX_PACKET_SIZE as usize];
    let mut forwarded = 0;
    loop {
        match ep.read(&mut packet).await {
            Ok(n) => {
                pipe.write_all(&packet[..n]).await;
                forwarded += n;
            }
            // Host sent more than one packet's worth; nothing to salvage
            Err(EndpointError::BufferOverflow) => {}
            Err(EndpointError::Disabled) => break,
        }
    }

    pipe.clear();
    forwarded
}

/// Send one touch report on the bulk IN endpoint
pub async fn send_touch_report<E: EndpointIn>(
    ep: &mut E,
    report: TouchReport,
) -> Result<(), EndpointError> {
    ep.write(&report.encode()).await
}
