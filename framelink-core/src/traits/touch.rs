//! Touch controller trait

use core::future::Future;

/// Errors from the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchError {
    /// Bus transfer failed
    Bus,
    /// Interrupt line could not be awaited
    Interrupt,
}

/// Touch position in panel pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Interrupt-driven touch controller
pub trait TouchController {
    /// Block until the controller signals new touch data
    fn wait_interrupt(&mut self) -> impl Future<Output = Result<(), TouchError>>;

    /// Read the current touch point
    ///
    /// Returns `Ok(None)` when nothing is touching the panel.
    fn read_point(&mut self) -> impl Future<Output = Result<Option<TouchPoint>, TouchError>>;
}
