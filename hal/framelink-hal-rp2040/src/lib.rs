//! RP2040-specific glue for the Framelink firmware
//!
//! Implements the collaborator traits of `framelink-core` on top of
//! embassy-rp and embassy-usb:
//!
//! - USB vendor interface, mount tracking and the OUT-endpoint pump
//! - `VendorChannel` over the pump's byte pipe
//! - `MonotonicTimer` over embassy-time

#![no_std]

pub mod timer;
pub mod usb;

pub use timer::EmbassyTimer;
pub use usb::{MountFlag, MountHandler, PipeChannel};
