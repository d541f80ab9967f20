//! Embassy async tasks
//!
//! Each task owns its stage of the pipeline and communicates with the
//! others only through the statics in [`crate::channels`].

pub mod presenter;
pub mod reassembler;
pub mod touch;
pub mod usb;

pub use presenter::presenter_task;
pub use reassembler::reassembler_task;
pub use touch::{touch_report_task, touch_task};
pub use usb::{usb_device_task, usb_pump_task};
