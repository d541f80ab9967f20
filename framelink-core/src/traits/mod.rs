//! Collaborator traits
//!
//! These traits define the interface between the pipeline and the
//! board-specific USB stack, decoder, panel and touch controller.

pub mod decoder;
pub mod display;
pub mod timer;
pub mod touch;
pub mod usb;

pub use decoder::{DecodeError, ImageDecoder};
pub use display::{DisplayError, FrameDisplay, Rgb565};
pub use timer::MonotonicTimer;
pub use touch::{TouchController, TouchError, TouchPoint};
pub use usb::VendorChannel;
