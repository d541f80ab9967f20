//! Write cursor over a fixed-capacity byte buffer

/// Attempt to advance past the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorError {
    pub filled: usize,
    pub requested: usize,
    pub capacity: usize,
}

/// Tracks how much of a buffer has been written
///
/// Callers write into [`spare_mut`](Self::spare_mut) and then report the
/// number of bytes written with [`advance`](Self::advance).
#[derive(Debug)]
pub struct FrameCursor<'a> {
    buf: &'a mut [u8],
    filled: usize,
}

impl<'a> FrameCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, filled: 0 }
    }

    /// Bytes written so far
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.filled
    }

    /// The written prefix of the buffer
    pub fn filled_bytes(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Unwritten space, limited to at most `max` bytes
    pub fn spare_mut(&mut self, max: usize) -> &mut [u8] {
        let end = self.filled + max.min(self.remaining());
        &mut self.buf[self.filled..end]
    }

    /// Mark `n` more bytes as written
    pub fn advance(&mut self, n: usize) -> Result<(), CursorError> {
        if n > self.remaining() {
            return Err(CursorError {
                filled: self.filled,
                requested: n,
                capacity: self.buf.len(),
            });
        }
        self.filled += n;
        Ok(())
    }

    /// Discard everything written
    pub fn reset(&mut self) {
        self.filled = 0;
    }
}
