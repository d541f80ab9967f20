//! USB vendor channel trait

/// Receive side of the USB vendor interface
///
/// The USB stack runs elsewhere and buffers incoming bulk OUT data; this
/// trait only exposes what the reassembler needs to drain it. None of the
/// methods block.
pub trait VendorChannel {
    /// Whether the host has configured the device
    fn is_mounted(&self) -> bool;

    /// Number of bytes that can be read without waiting
    fn available(&self) -> usize;

    /// Read up to `buf.len()` bytes, returning how many were copied
    ///
    /// Returns 0 when nothing is buffered.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}
