//! Image decoders

pub mod qoi;

pub use qoi::{QoiDecoder, QOI_HEADER_LEN};
