//! Display double buffering

/// Two framebuffers, one on screen and one being drawn
///
/// The decoder only ever writes to the back buffer; [`flip`](Self::flip)
/// swaps the roles once the back buffer has been handed to the panel.
pub struct DoubleBuffer<'a> {
    buffers: [&'a mut [u8]; 2],
    back: usize,
}

impl<'a> DoubleBuffer<'a> {
    /// Create from two equally sized buffers; buffer 0 is drawn first
    pub fn new(first: &'a mut [u8], second: &'a mut [u8]) -> Self {
        Self {
            buffers: [first, second],
            back: 0,
        }
    }

    /// Size of one framebuffer (the smaller one if they differ)
    pub fn len(&self) -> usize {
        self.buffers[0].len().min(self.buffers[1].len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the buffer the next frame is decoded into
    pub fn back_index(&self) -> usize {
        self.back
    }

    /// Index of the buffer last presented
    pub fn front_index(&self) -> usize {
        self.back ^ 1
    }

    pub fn back(&self) -> &[u8] {
        &self.buffers[self.back][..]
    }

    pub fn back_mut(&mut self) -> &mut [u8] {
        let back = self.back;
        &mut self.buffers[back][..]
    }

    /// Swap front and back, returning the index now on screen
    pub fn flip(&mut self) -> usize {
        self.back ^= 1;
        self.front_index()
    }
}
