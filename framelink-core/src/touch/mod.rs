//! Touch sampling
//!
//! Runs independently of the image pipeline. The sampler turns controller
//! interrupts into [`TouchEvent`]s; the latest point is parked in a
//! [`TouchSlot`] for whoever reports it to the host.

pub mod sampler;
pub mod slot;

pub use sampler::{TouchEvent, TouchSampler, TouchStats};
pub use slot::TouchSlot;
