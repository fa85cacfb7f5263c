//! Engine configuration
//!
//! Static knobs that are fixed for the lifetime of a processor, as opposed to
//! the user-facing controls in [`crate::params`]. Loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EqError, Result};

/// Cutoffs are clamped to this fraction of the sample rate before design
pub const DEFAULT_NYQUIST_GUARD: f64 = 0.45;

/// Block capacity assumed when the host does not announce one
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4096;

/// Magnitudes below this are flushed to zero
pub const DENORMAL_THRESHOLD: f64 = 1e-15;

/// Processor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cutoff clamp ratio: every designed frequency is limited to
    /// `nyquist_guard * sample_rate`
    pub nyquist_guard: f64,
    /// Maximum block size used when `prepare` is given zero
    pub max_block_size: usize,
    /// Flush near-zero inputs and delay registers
    pub flush_denormals: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nyquist_guard: DEFAULT_NYQUIST_GUARD,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            flush_denormals: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON string and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EqError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.nyquist_guard > 0.0 && self.nyquist_guard < 0.5) {
            return Err(EqError::InvalidParameter {
                param: "nyquist_guard".to_string(),
                value: self.nyquist_guard.to_string(),
                expected: "0 < ratio < 0.5".to_string(),
            });
        }

        if self.max_block_size == 0 {
            return Err(EqError::InvalidParameter {
                param: "max_block_size".to_string(),
                value: "0".to_string(),
                expected: "at least 1 sample".to_string(),
            });
        }

        Ok(())
    }
}
