//! Framelink USB wire format
//!
//! This crate defines the byte-stream protocol spoken over the USB vendor
//! interface between the streaming host and the display device.
//!
//! # Protocol Overview
//!
//! The host writes a continuous stream of length-prefixed frames to the
//! bulk OUT endpoint:
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ LENGTH (LE)  │ PAYLOAD                      │
//! │ 4B           │ LENGTH - 4 bytes             │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! LENGTH counts the header itself. There is no sync byte and no checksum;
//! the USB bulk transport already guarantees integrity and ordering, and a
//! payload the decoder rejects is simply skipped.
//!
//! The device reports touch points back on the bulk IN endpoint as fixed
//! 4-byte [`TouchReport`] records.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod touch;

pub use frame::{FrameHeader, HeaderError, FRAME_HEADER_LEN, MIN_FRAME_LEN};
pub use touch::{TouchReport, TOUCH_REPORT_LEN};

/// USB vendor ID the host sender looks for
pub const USB_VID: u16 = 0x303a;

/// USB product ID the host sender looks for
pub const USB_PID: u16 = 0x4020;
