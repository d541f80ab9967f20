//! Frame header encoding and decoding for the USB image stream.
//!
//! Frame format:
//! - LENGTH (4 bytes, little-endian): total frame length including LENGTH
//! - PAYLOAD (LENGTH - 4 bytes): compressed image data

/// Size of the length prefix in bytes
pub const FRAME_HEADER_LEN: usize = 4;

/// Smallest frame the device accepts (header plus one payload byte)
pub const MIN_FRAME_LEN: usize = FRAME_HEADER_LEN + 1;

/// Errors that can occur while interpreting a frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// Fewer than [`FRAME_HEADER_LEN`] bytes were supplied
    Incomplete,
    /// Declared length leaves no room for a payload
    TooShort {
        /// Declared total length
        total_len: u32,
    },
    /// Declared length does not fit the receive buffer
    TooLarge {
        /// Declared total length
        total_len: u32,
        /// Receive buffer capacity
        capacity: usize,
    },
    /// Payload does not fit the 32-bit length field
    PayloadTooLarge,
}

/// Length prefix of one frame on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    total_len: u32,
}

impl FrameHeader {
    /// Create a header from a raw total length (header included)
    pub const fn new(total_len: u32) -> Self {
        Self { total_len }
    }

    /// Create the header that precedes a payload of `payload_len` bytes
    pub fn for_payload(payload_len: usize) -> Result<Self, HeaderError> {
        let total = payload_len
            .checked_add(FRAME_HEADER_LEN)
            .ok_or(HeaderError::PayloadTooLarge)?;
        let total_len = u32::try_from(total).map_err(|_| HeaderError::PayloadTooLarge)?;
        Ok(Self { total_len })
    }

    /// Parse the header from the first four bytes of `bytes`
    ///
    /// Extra bytes after the header are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        let raw: [u8; FRAME_HEADER_LEN] = bytes
            .get(..FRAME_HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(HeaderError::Incomplete)?;
        Ok(Self {
            total_len: u32::from_le_bytes(raw),
        })
    }

    /// Encode the header into its wire representation
    pub fn encode(&self) -> [u8; FRAME_HEADER_LEN] {
        self.total_len.to_le_bytes()
    }

    /// Total frame length, header included
    pub fn total_len(&self) -> usize {
        self.total_len as usize
    }

    /// Payload length (total length minus the header)
    pub fn payload_len(&self) -> usize {
        self.total_len().saturating_sub(FRAME_HEADER_LEN)
    }

    /// Check that the frame carries a payload and fits a buffer of `capacity` bytes
    pub fn validate(&self, capacity: usize) -> Result<(), HeaderError> {
        if self.total_len() < MIN_FRAME_LEN {
            return Err(HeaderError::TooShort {
                total_len: self.total_len,
            });
        }
        if self.total_len() > capacity {
            return Err(HeaderError::TooLarge {
                total_len: self.total_len,
                capacity,
            });
        }
        Ok(())
    }
}
