//! Image decoder trait

use core::future::Future;

/// Errors reported by an image decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload does not start with a recognised image header
    InvalidHeader,
    /// Image dimensions differ from the panel
    DimensionMismatch { width: u32, height: u32 },
    /// Decoded image does not fit the output buffer
    OutputTooSmall,
    /// Payload ended before the image was complete
    Truncated,
    /// Payload contains an invalid chunk
    Corrupt,
}

/// Decodes one compressed payload into raw panel pixels
pub trait ImageDecoder {
    /// Decode `input` into `output`
    ///
    /// # Returns
    /// The number of bytes written to `output`, or an error. On error the
    /// contents of `output` are unspecified.
    fn decode(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> impl Future<Output = Result<usize, DecodeError>>;
}
