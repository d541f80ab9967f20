//! Display trait for framebuffer panels

use core::future::Future;

/// Errors that can occur while driving the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed
    Bus,
    /// Control pin could not be driven
    Pin,
    /// Framebuffer length does not match the panel
    SizeMismatch { expected: usize, actual: usize },
}

/// 16-bit 5-6-5 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const BLUE: Self = Self(0x001F);
    pub const WHITE: Self = Self(0xFFFF);

    /// Pack 8-bit channels, dropping the low bits
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Big-endian bytes as the panel expects them on the wire
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

/// A panel fed from full-screen framebuffers
pub trait FrameDisplay {
    /// Framebuffer size in bytes for one full screen
    fn framebuffer_len(&self) -> usize;

    /// Fill the whole panel with one color
    fn clear(&mut self, color: Rgb565) -> impl Future<Output = Result<(), DisplayError>>;

    /// Present a full framebuffer
    fn flush(&mut self, framebuffer: &[u8]) -> impl Future<Output = Result<(), DisplayError>>;

    /// Wait until the previously flushed framebuffer is no longer being read
    fn wait_flip_complete(&mut self) -> impl Future<Output = ()>;
}
