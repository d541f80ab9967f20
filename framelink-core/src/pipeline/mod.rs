//! Capture, handoff and presentation of frames
//!
//! ```text
//! VendorChannel -> FrameReassembler -> HandoffQueue -> FramePresenter -> FrameDisplay
//! ```
//!
//! The reassembler and presenter each own their task state; the only
//! things they share are the [`ReceivePool`](crate::buffer::ReceivePool)
//! and the [`HandoffQueue`].

pub mod fps;
pub mod presenter;
pub mod queue;
pub mod reassembler;

pub use fps::{FpsMeter, FpsReport};
pub use presenter::{FramePresenter, PresentEvent, PresentOutcome, PresenterStats};
pub use queue::{BackpressurePolicy, HandoffQueue};
pub use reassembler::{
    AbortReason, FrameReassembler, ReassemblerEvent, ReassemblerState, ReassemblerStats,
};
