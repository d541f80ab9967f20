//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in framelink-core:
//!
//! - Image decoders (QOI into RGB565)
//! - Framebuffer panels (ST7789 over SPI)
//! - Touch controllers (FT6x06 over I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod decoder;
pub mod display;
pub mod touch;
