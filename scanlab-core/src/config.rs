//! Experiment configuration
//!
//! Sizes, distances and seeds the experiments depend on. Defaults are the
//! values the experiments were designed around; the binary overrides them
//! from flags and environment variables.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{invalid_config, Result};
use crate::prefetch::DEFAULT_LOOKAHEAD;
use crate::rng::DEFAULT_SEED;

/// Default column length: 32 Mi elements, far larger than a typical L2
pub const DEFAULT_ELEMENTS: usize = 32 * 1024 * 1024;
/// Default number of threshold steps in a sweep
pub const DEFAULT_STEPS: usize = 11;
/// Default length of the subtract experiment
pub const DEFAULT_UNROLL_ELEMENTS: usize = 256 * 1024 * 1024;
/// Default copy length: deliberately not a multiple of 8
pub const DEFAULT_DUFF_ELEMENTS: usize = 255;
/// Default cache-residency scan area
pub const DEFAULT_SCAN_BYTES: usize = 32 * 1024 * 1024;
/// Default total bytes streamed through the scan area
pub const DEFAULT_TOTAL_BYTES: u64 = 64 * 1024 * 1024 * 1024;

/// Tunables for every experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentConfig {
    /// Column length for prefetch and selection experiments
    pub elements: usize,
    /// Software prefetch distance in iterations
    pub lookahead: usize,
    /// Threshold steps in selection sweeps
    pub steps: usize,
    /// Generator seed
    pub seed: u64,
    /// Sort the column before a selection sweep
    pub sorted: bool,
    /// Length of the subtract experiment
    pub unroll_elements: usize,
    /// Length of the copy experiment
    pub duff_elements: usize,
    /// Bytes in the repeatedly scanned area
    pub scan_bytes: usize,
    /// Bytes streamed through that area in total
    pub total_bytes: u64,
    /// Column file for file-backed experiments
    pub path: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            elements: DEFAULT_ELEMENTS,
            lookahead: DEFAULT_LOOKAHEAD,
            steps: DEFAULT_STEPS,
            seed: DEFAULT_SEED,
            sorted: false,
            unroll_elements: DEFAULT_UNROLL_ELEMENTS,
            duff_elements: DEFAULT_DUFF_ELEMENTS,
            scan_bytes: DEFAULT_SCAN_BYTES,
            total_bytes: DEFAULT_TOTAL_BYTES,
            path: None,
        }
    }
}

impl ExperimentConfig {
    /// Reject settings no experiment can run with
    pub fn validate(&self) -> Result<()> {
        if self.lookahead == 0 {
            return Err(invalid_config("lookahead must be at least 1"));
        }
        if self.steps < 2 {
            return Err(invalid_config("steps must be at least 2"));
        }
        if self.scan_bytes < core::mem::size_of::<i64>() {
            return Err(invalid_config("scan area must hold at least one 8-byte element"));
        }
        if self.total_bytes < self.scan_bytes as u64 {
            return Err(invalid_config("total bytes must be at least the scan area"));
        }
        Ok(())
    }

    /// Passes over the scan area needed to stream `total_bytes`
    pub fn scan_passes(&self) -> u64 {
        self.total_bytes / self.scan_bytes.max(1) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_is_valid() {
        let config = ExperimentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_passes(), 2048);
        assert_eq!(config.lookahead, 128);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_rejects_single_step() {
        let config = ExperimentConfig { steps: 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_lookahead() {
        let config = ExperimentConfig { lookahead: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_total_below_scan_area() {
        let config = ExperimentConfig { scan_bytes: 4096, total_bytes: 1024, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
