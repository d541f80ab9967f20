//! Board-agnostic core of the Framelink image pipeline
//!
//! This crate contains everything between the USB byte stream and the
//! panel that does not depend on a specific chip:
//!
//! - Collaborator traits (USB channel, decoder, display, touch, timer)
//! - Receive buffer pool, frame cursor and display double buffer
//! - Single-slot handoff queue between capture and decode
//! - Frame reassembler (producer) and frame presenter (consumer)
//! - Touch sampler and latest-value touch slot
//! - Pipeline configuration types and parser
//!
//! Nothing here logs. Each task context returns a typed event describing
//! what happened and the firmware decides how loud to be about it.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod pipeline;
pub mod touch;
pub mod traits;

#[cfg(test)]
mod mock;
