//! QOI image decoder
//!
//! Decodes "Quite OK Image" payloads straight into a big-endian RGB565
//! framebuffer. The whole image is decoded in one pass with a 64-entry
//! color index and no other state, which suits a fixed-size panel.
//!
//! # Format
//!
//! - Header (14 bytes): `qoif`, width (u32 BE), height (u32 BE),
//!   channels (3 or 4), colorspace (0 or 1)
//! - Chunks: RGB, RGBA, INDEX, DIFF, LUMA, RUN
//! - End marker: seven `0x00` bytes then `0x01`
//!
//! Alpha is decoded (it feeds the color index) but not drawn.

use framelink_core::traits::{DecodeError, ImageDecoder, Rgb565};

/// Size of the QOI header in bytes
pub const QOI_HEADER_LEN: usize = 14;

const MAGIC: [u8; 4] = *b"qoif";
const END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

/// Chunk tags
mod op {
    pub const RGB: u8 = 0xFE;
    pub const RGBA: u8 = 0xFF;
    pub const INDEX: u8 = 0x00;
    pub const DIFF: u8 = 0x40;
    pub const LUMA: u8 = 0x80;
    pub const RUN: u8 = 0xC0;
    pub const MASK: u8 = 0xC0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pixel {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Pixel {
    const ZERO: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    const START: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    fn hash(self) -> usize {
        (usize::from(self.r) * 3
            + usize::from(self.g) * 5
            + usize::from(self.b) * 7
            + usize::from(self.a) * 11)
            % 64
    }

    fn to_rgb565(self) -> [u8; 2] {
        Rgb565::from_rgb888(self.r, self.g, self.b).to_be_bytes()
    }
}

/// Parsed QOI header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QoiHeader {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub colorspace: u8,
}

impl QoiHeader {
    pub fn parse(input: &[u8]) -> Result<Self, DecodeError> {
        let header = input
            .get(..QOI_HEADER_LEN)
            .ok_or(DecodeError::InvalidHeader)?;
        if header[..4] != MAGIC {
            return Err(DecodeError::InvalidHeader);
        }
        let width = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        let height = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
        let channels = header[12];
        let colorspace = header[13];
        if !(channels == 3 || channels == 4) || colorspace > 1 {
            return Err(DecodeError::InvalidHeader);
        }
        Ok(Self {
            width,
            height,
            channels,
            colorspace,
        })
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Result<u8, DecodeError> {
        let b = *self.data.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

/// QOI decoder for a panel of fixed dimensions
#[derive(Debug, Clone)]
pub struct QoiDecoder {
    width: u32,
    height: u32,
}

impl QoiDecoder {
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            width: width as u32,
            height: height as u32,
        }
    }

    /// Bytes of RGB565 output one image produces
    pub fn output_len(&self) -> usize {
        self.width as usize * self.height as usize * 2
    }

    /// Decode `input` into `output`, returning the bytes written
    pub fn decode_into(&self, input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
        let header = QoiHeader::parse(input)?;
        if header.width != self.width || header.height != self.height {
            return Err(DecodeError::DimensionMismatch {
                width: header.width,
                height: header.height,
            });
        }

        let out_len = self.output_len();
        let output = output
            .get_mut(..out_len)
            .ok_or(DecodeError::OutputTooSmall)?;

        let mut reader = Reader {
            data: &input[QOI_HEADER_LEN..],
            pos: 0,
        };
        let mut index = [Pixel::ZERO; 64];
        let mut px = Pixel::START;
        let mut pixels = output.chunks_exact_mut(2);

        loop {
            let b1 = match pixels.len() {
                0 => break,
                _ => reader.byte()?,
            };
            let mut run = 1;

            match b1 {
                op::RGB => {
                    px.r = reader.byte()?;
                    px.g = reader.byte()?;
                    px.b = reader.byte()?;
                }
                op::RGBA => {
                    px.r = reader.byte()?;
                    px.g = reader.byte()?;
                    px.b = reader.byte()?;
                    px.a = reader.byte()?;
                }
                _ => match b1 & op::MASK {
                    op::INDEX => px = index[usize::from(b1)],
                    op::DIFF => {
                        px.r = px.r.wrapping_add(((b1 >> 4) & 0x03).wrapping_sub(2));
                        px.g = px.g.wrapping_add(((b1 >> 2) & 0x03).wrapping_sub(2));
                        px.b = px.b.wrapping_add((b1 & 0x03).wrapping_sub(2));
                    }
                    op::LUMA => {
                        let b2 = reader.byte()?;
                        let vg = (b1 & 0x3F).wrapping_sub(32);
                        px.r = px
                            .r
                            .wrapping_add(vg.wrapping_sub(8).wrapping_add((b2 >> 4) & 0x0F));
                        px.g = px.g.wrapping_add(vg);
                        px.b = px.b.wrapping_add(vg.wrapping_sub(8).wrapping_add(b2 & 0x0F));
                    }
                    _ => run = usize::from(b1 & 0x3F) + 1,
                },
            }

            index[px.hash()] = px;

            if run > pixels.len() {
                return Err(DecodeError::Corrupt);
            }
            let color = px.to_rgb565();
            for out in pixels.by_ref().take(run) {
                out.copy_from_slice(&color);
            }
        }

        match reader.rest().get(..END_MARKER.len()) {
            None => Err(DecodeError::Truncated),
            Some(marker) if marker != END_MARKER => Err(DecodeError::Corrupt),
            Some(_) => Ok(out_len),
        }
    }
}

impl ImageDecoder for QoiDecoder {
    async fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
        self.decode_into(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use proptest::prelude::*;

    fn header(width: u32, height: u32, channels: u8) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.push(channels);
        bytes.push(0);
        bytes
    }

    fn image(width: u32, height: u32, chunks: &[u8]) -> Vec<u8> {
        let mut bytes = header(width, height, 4);
        bytes.extend_from_slice(chunks);
        bytes.extend_from_slice(&END_MARKER);
        bytes
    }

    fn rgb565(r: u8, g: u8, b: u8) -> [u8; 2] {
        Rgb565::from_rgb888(r, g, b).to_be_bytes()
    }

    /// Minimal encoder using only RGB and RUN chunks
    fn encode(width: u32, height: u32, pixels: &[(u8, u8, u8)]) -> Vec<u8> {
        let mut chunks = Vec::new();
        let mut prev = (0, 0, 0);
        let mut run = 0u8;
        for &p in pixels {
            if p == prev {
                run += 1;
                if run == 62 {
                    chunks.push(op::RUN | (run - 1));
                    run = 0;
                }
                continue;
            }
            if run > 0 {
                chunks.push(op::RUN | (run - 1));
                run = 0;
            }
            chunks.extend_from_slice(&[op::RGB, p.0, p.1, p.2]);
            prev = p;
        }
        if run > 0 {
            chunks.push(op::RUN | (run - 1));
        }
        image(width, height, &chunks)
    }

    #[test]
    fn test_header_validation() {
        let decoder = QoiDecoder::new(2, 2);
        let mut out = [0u8; 8];

        let mut bad_magic = image(2, 2, &[]);
        bad_magic[0] = b'j';
        assert_eq!(
            decoder.decode_into(&bad_magic, &mut out),
            Err(DecodeError::InvalidHeader)
        );

        let mut bad_channels = image(2, 2, &[]);
        bad_channels[12] = 2;
        assert_eq!(
            decoder.decode_into(&bad_channels, &mut out),
            Err(DecodeError::InvalidHeader)
        );

        assert_eq!(
            decoder.decode_into(&MAGIC, &mut out),
            Err(DecodeError::InvalidHeader)
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let decoder = QoiDecoder::new(240, 135);
        let mut out = [0u8; 8];
        assert_eq!(
            decoder.decode_into(&image(320, 240, &[]), &mut out),
            Err(DecodeError::DimensionMismatch {
                width: 320,
                height: 240
            })
        );
    }

    #[test]
    fn test_output_too_small() {
        let decoder = QoiDecoder::new(2, 2);
        let mut out = [0u8; 7];
        assert_eq!(
            decoder.decode_into(&image(2, 2, &[op::RUN | 3]), &mut out),
            Err(DecodeError::OutputTooSmall)
        );
    }

    #[test]
    fn test_every_chunk_type() {
        // red, DIFF(+1, 0, -1), INDEX(red), LUMA(vg=+10)
        let red_slot = Pixel {
            r: 255,
            g: 0,
            b: 0,
            a: 255,
        }
        .hash() as u8;
        let chunks = [
            op::RGB,
            255,
            0,
            0,
            op::DIFF | (3 << 4) | (2 << 2) | 1,
            op::INDEX | red_slot,
            op::LUMA | 42,
            0x88,
        ];
        let decoder = QoiDecoder::new(2, 2);
        let mut out = [0u8; 8];
        assert_eq!(decoder.decode_into(&image(2, 2, &chunks), &mut out), Ok(8));

        let expected: Vec<u8> = [rgb565(255, 0, 0), rgb565(0, 0, 255), rgb565(255, 0, 0), rgb565(9, 10, 10)]
            .concat();
        assert_eq!(out.to_vec(), expected);
    }

    #[test]
    fn test_rgba_and_run() {
        let chunks = [op::RGBA, 10, 20, 30, 0, op::RUN | 1];
        let decoder = QoiDecoder::new(3, 1);
        let mut out = [0u8; 6];
        block_on(decoder.clone().decode(&image(3, 1, &chunks), &mut out)).unwrap();
        assert_eq!(out.to_vec(), rgb565(10, 20, 30).repeat(3));
    }

    #[test]
    fn test_run_past_end_is_corrupt() {
        let decoder = QoiDecoder::new(2, 1);
        let mut out = [0u8; 4];
        assert_eq!(
            decoder.decode_into(&image(2, 1, &[op::RGB, 1, 2, 3, op::RUN | 2]), &mut out),
            Err(DecodeError::Corrupt)
        );
    }

    #[test]
    fn test_truncated_and_bad_end_marker() {
        let decoder = QoiDecoder::new(2, 1);
        let mut out = [0u8; 4];
        let full = image(2, 1, &[op::RGB, 1, 2, 3, op::RUN]);

        assert_eq!(
            decoder.decode_into(&full[..QOI_HEADER_LEN + 2], &mut out),
            Err(DecodeError::Truncated)
        );
        assert_eq!(
            decoder.decode_into(&full[..full.len() - 1], &mut out),
            Err(DecodeError::Truncated)
        );

        let mut bad_end = full.clone();
        let last = bad_end.len() - 1;
        bad_end[last] = 0x02;
        assert_eq!(decoder.decode_into(&bad_end, &mut out), Err(DecodeError::Corrupt));
    }

    proptest! {
        #[test]
        fn prop_decodes_encoder_output(
            pixels in proptest::collection::vec(
                prop::sample::select(vec![(0u8, 0u8, 0u8), (255, 0, 0), (12, 200, 7), (255, 255, 255)]),
                1..200,
            ),
        ) {
            let width = pixels.len() as u16;
            let decoder = QoiDecoder::new(width, 1);
            let mut out = vec![0u8; decoder.output_len()];
            let encoded = encode(u32::from(width), 1, &pixels);

            prop_assert_eq!(decoder.decode_into(&encoded, &mut out), Ok(out.len()));
            let expected: Vec<u8> = pixels.iter().flat_map(|&(r, g, b)| rgb565(r, g, b)).collect();
            prop_assert_eq!(out, expected);
        }
    }
}
