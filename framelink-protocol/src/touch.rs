//! Touch reports sent from the device to the host
//!
//! Each report is a fixed 4-byte record on the bulk IN endpoint:
//! - X (2 bytes, little-endian)
//! - Y (2 bytes, little-endian)

/// Size of one encoded touch report
pub const TOUCH_REPORT_LEN: usize = 4;

/// A single touch coordinate in panel pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchReport {
    pub x: u16,
    pub y: u16,
}

impl TouchReport {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Encode into the wire representation
    pub fn encode(&self) -> [u8; TOUCH_REPORT_LEN] {
        let x = self.x.to_le_bytes();
        let y = self.y.to_le_bytes();
        [x[0], x[1], y[0], y[1]]
    }

    /// Decode a report from the start of `bytes`
    ///
    /// Returns `None` if fewer than [`TOUCH_REPORT_LEN`] bytes are supplied.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [x0, x1, y0, y1, ..] => Some(Self {
                x: u16::from_le_bytes([*x0, *x1]),
                y: u16::from_le_bytes([*y0, *y1]),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let report = TouchReport::new(0x0102, 0x00EF);
        assert_eq!(report.encode(), [0x02, 0x01, 0xEF, 0x00]);
    }

    #[test]
    fn test_decode_short_input() {
        assert_eq!(TouchReport::decode(&[1, 2, 3]), None);
    }

    #[test]
    fn test_decode_from_stream() {
        let bytes = [0x10, 0x00, 0x20, 0x00, 0xAA];
        assert_eq!(TouchReport::decode(&bytes), Some(TouchReport::new(16, 32)));
    }
}
