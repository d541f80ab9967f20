//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest read issued to the USB channel
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Bytes that must be buffered before a header read starts
pub const DEFAULT_MIN_HEADER_BYTES: usize = 2;

/// Header bytes the wire format defines; upper bound for `min_header_bytes`
pub const MAX_MIN_HEADER_BYTES: usize = framelink_protocol::FRAME_HEADER_LEN;

/// Bounded wait used while a frame is partially received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BackoffPolicy {
    /// Empty polls tolerated before the frame is abandoned
    pub max_attempts: u32,
    /// Delay between polls (µs)
    pub delay_us: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            delay_us: 20,
        }
    }
}

impl BackoffPolicy {
    /// Worst-case time spent waiting before giving up (µs)
    pub fn budget_us(&self) -> u64 {
        u64::from(self.max_attempts) * u64::from(self.delay_us)
    }
}

/// Frame reassembler tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReassemblerConfig {
    /// Maximum bytes per channel read
    pub chunk_size: usize,
    /// Bytes buffered before starting a header
    pub min_header_bytes: usize,
    /// Sleep when mounted but idle (µs)
    pub idle_poll_us: u32,
    /// Sleep while the host is not connected (ms)
    pub unmounted_poll_ms: u32,
    /// Wait policy for a stalled frame
    pub stall: BackoffPolicy,
}

impl Default for ReassemblerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_header_bytes: DEFAULT_MIN_HEADER_BYTES,
            idle_poll_us: 100,
            unmounted_poll_ms: 100,
            stall: BackoffPolicy::default(),
        }
    }
}

/// Frame presenter tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresenterConfig {
    /// Throughput report window (ms)
    pub report_interval_ms: u32,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: 1000,
        }
    }
}

impl PresenterConfig {
    /// Report window in timer ticks
    pub fn report_interval_ticks(&self, ticks_per_second: u64) -> u64 {
        u64::from(self.report_interval_ms) * ticks_per_second / 1000
    }
}

/// Touch sampler tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchConfig {
    /// Pause after a failed interrupt wait or read (ms)
    pub retry_delay_ms: u32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self { retry_delay_ms: 10 }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    pub reassembler: ReassemblerConfig,
    pub presenter: PresenterConfig,
    pub touch: TouchConfig,
}

/// Reasons a configuration is unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// `chunk_size` is zero
    ZeroChunkSize,
    /// `min_header_bytes` is outside 1..=4
    HeaderThreshold(usize),
    /// `stall_max_attempts` is zero
    ZeroStallAttempts,
    /// `report_interval_ms` is zero
    ZeroReportInterval,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let r = &self.reassembler;
        if r.chunk_size == 0 {
            return Err(ValidationError::ZeroChunkSize);
        }
        if r.min_header_bytes == 0 || r.min_header_bytes > MAX_MIN_HEADER_BYTES {
            return Err(ValidationError::HeaderThreshold(r.min_header_bytes));
        }
        if r.stall.max_attempts == 0 {
            return Err(ValidationError::ZeroStallAttempts);
        }
        if self.presenter.report_interval_ms == 0 {
            return Err(ValidationError::ZeroReportInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reassembler.chunk_size, 512);
        assert_eq!(config.reassembler.stall.max_attempts, 1000);
        assert_eq!(config.reassembler.unmounted_poll_ms, 100);
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let mut config = PipelineConfig::default();
        config.reassembler.chunk_size = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroChunkSize));

        let mut config = PipelineConfig::default();
        config.reassembler.min_header_bytes = 5;
        assert_eq!(config.validate(), Err(ValidationError::HeaderThreshold(5)));

        let mut config = PipelineConfig::default();
        config.reassembler.stall.max_attempts = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroStallAttempts));

        let mut config = PipelineConfig::default();
        config.presenter.report_interval_ms = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroReportInterval));
    }

    #[test]
    fn test_report_interval_in_ticks() {
        let config = PresenterConfig::default();
        assert_eq!(config.report_interval_ticks(1_000_000), 1_000_000);
        assert_eq!(config.report_interval_ticks(32_768), 32_768);
    }
}
