//! Parser for the pipeline TOML file
//!
//! Handles only the subset the pipeline file uses:
//! - `[section]` headers
//! - `key = integer` pairs (underscores allowed as digit separators)
//! - Comments (# ...)
//!
//! Keys that are missing keep their default. Unknown sections and keys are
//! errors so typos do not silently fall back to defaults.

use heapless::String;

use super::types::{PipelineConfig, ValidationError};

/// Longest integer literal accepted, separators included
const MAX_NUMBER_LEN: usize = 16;

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigErrorKind {
    /// Line is neither a section header nor `key = value`
    Syntax,
    /// Section name not recognised
    UnknownSection,
    /// Key not recognised in its section
    UnknownKey,
    /// Key appears before any section header
    KeyOutsideSection,
    /// Value is not a non-negative integer in range
    InvalidNumber,
    /// File parsed but the values are unusable
    Invalid(ValidationError),
}

/// Parse error with the 1-based line it occurred on
///
/// Validation failures are reported with line 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    pub line: usize,
    pub kind: ConfigErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Reassembler,
    Presenter,
    Touch,
}

/// Parse and validate a pipeline configuration
pub fn parse_pipeline_config(input: &str) -> Result<PipelineConfig, ConfigError> {
    let mut config = PipelineConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let err = |kind| ConfigError {
            line: line_no,
            kind,
        };

        let line = match raw.split_once('#') {
            Some((before, _)) => before,
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix('[') {
            let name = name
                .strip_suffix(']')
                .ok_or(err(ConfigErrorKind::Syntax))?
                .trim();
            section = match name {
                "reassembler" => Section::Reassembler,
                "presenter" => Section::Presenter,
                "touch" => Section::Touch,
                _ => return Err(err(ConfigErrorKind::UnknownSection)),
            };
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(err(ConfigErrorKind::Syntax))?;
        let key = key.trim();
        let value = parse_number(value.trim()).ok_or(err(ConfigErrorKind::InvalidNumber))?;
        apply(&mut config, section, key, value).map_err(err)?;
    }

    config.validate().map_err(|e| ConfigError {
        line: 0,
        kind: ConfigErrorKind::Invalid(e),
    })?;
    Ok(config)
}

fn apply(
    config: &mut PipelineConfig,
    section: Section,
    key: &str,
    value: u32,
) -> Result<(), ConfigErrorKind> {
    match section {
        Section::Root => return Err(ConfigErrorKind::KeyOutsideSection),
        Section::Reassembler => {
            let r = &mut config.reassembler;
            match key {
                "chunk_size" => r.chunk_size = value as usize,
                "min_header_bytes" => r.min_header_bytes = value as usize,
                "idle_poll_us" => r.idle_poll_us = value,
                "unmounted_poll_ms" => r.unmounted_poll_ms = value,
                "stall_max_attempts" => r.stall.max_attempts = value,
                "stall_delay_us" => r.stall.delay_us = value,
                _ => return Err(ConfigErrorKind::UnknownKey),
            }
        }
        Section::Presenter => match key {
            "report_interval_ms" => config.presenter.report_interval_ms = value,
            _ => return Err(ConfigErrorKind::UnknownKey),
        },
        Section::Touch => match key {
            "retry_delay_ms" => config.touch.retry_delay_ms = value,
            _ => return Err(ConfigErrorKind::UnknownKey),
        },
    }
    Ok(())
}

fn parse_number(value: &str) -> Option<u32> {
    if value.starts_with('_') || value.ends_with('_') {
        return None;
    }
    let mut digits: String<MAX_NUMBER_LEN> = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).ok()?;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
# Pipeline tuning
[reassembler]
chunk_size = 256
min_header_bytes = 4
idle_poll_us = 50
unmounted_poll_ms = 250
stall_max_attempts = 2_000   # ~40ms at 20us
stall_delay_us = 20

[presenter]
report_interval_ms = 500

[touch]
retry_delay_ms = 5
"#;

    #[test]
    fn test_parse_full_file() {
        let config = parse_pipeline_config(FULL).unwrap();
        assert_eq!(config.reassembler.chunk_size, 256);
        assert_eq!(config.reassembler.min_header_bytes, 4);
        assert_eq!(config.reassembler.idle_poll_us, 50);
        assert_eq!(config.reassembler.unmounted_poll_ms, 250);
        assert_eq!(config.reassembler.stall.max_attempts, 2000);
        assert_eq!(config.reassembler.stall.delay_us, 20);
        assert_eq!(config.presenter.report_interval_ms, 500);
        assert_eq!(config.touch.retry_delay_ms, 5);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_pipeline_config("[touch]\nretry_delay_ms = 1\n").unwrap();
        assert_eq!(config.reassembler, PipelineConfig::default().reassembler);
        assert_eq!(config.touch.retry_delay_ms, 1);

        assert_eq!(parse_pipeline_config(""), Ok(PipelineConfig::default()));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_pipeline_config("[reassembler]\nchunk_sise = 1\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError {
                line: 2,
                kind: ConfigErrorKind::UnknownKey
            }
        );

        let err = parse_pipeline_config("\n\n[display]\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, ConfigErrorKind::UnknownSection);

        let err = parse_pipeline_config("chunk_size = 1").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::KeyOutsideSection);

        let err = parse_pipeline_config("[touch]\nretry_delay_ms\n").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::Syntax);

        let err = parse_pipeline_config("[touch\n").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::Syntax);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        for value in ["-1", "1.5", "\"10\"", "_1", "99999999999", ""] {
            let input = format!("[touch]\nretry_delay_ms = {value}\n");
            assert_eq!(
                parse_pipeline_config(&input).unwrap_err().kind,
                ConfigErrorKind::InvalidNumber,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let err = parse_pipeline_config("[presenter]\nreport_interval_ms = 0\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError {
                line: 0,
                kind: ConfigErrorKind::Invalid(ValidationError::ZeroReportInterval)
            }
        );
    }
}
