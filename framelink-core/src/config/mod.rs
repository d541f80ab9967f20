//! Pipeline configuration
//!
//! Tunables for the reassembler, presenter and touch sampler, plus a small
//! parser for the TOML file the firmware embeds.

pub mod parser;
pub mod types;

pub use parser::{parse_pipeline_config, ConfigError, ConfigErrorKind};
pub use types::*;
