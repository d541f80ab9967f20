//! Pipeline configuration
//!
//! `pipeline.toml` is compiled into the firmware and checked by build.rs;
//! the runtime parse can still fail if the two validators disagree, in
//! which case the defaults are used.

use defmt::*;

use framelink_core::config::{parse_pipeline_config, PipelineConfig};

/// Embedded configuration (edit pipeline.toml and rebuild to customize)
const EMBEDDED_CONFIG: &str = include_str!("../pipeline.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load() -> PipelineConfig {
    match parse_pipeline_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Pipeline config: chunk={}B stall budget={}us report every {}ms",
                config.reassembler.chunk_size,
                config.reassembler.stall.budget_us(),
                config.presenter.report_interval_ms
            );
            config
        }
        Err(e) => {
            warn!(
                "pipeline.toml rejected at line {}: {:?}, using defaults",
                e.line, e.kind
            );
            PipelineConfig::default()
        }
    }
}
