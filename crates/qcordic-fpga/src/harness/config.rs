//! Harness configuration

use std::path::Path;

use qcordic_core::{CordicError, QFormat};
use serde::{Deserialize, Serialize};

use crate::error::UnitResult;

/// Configuration for a verification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Register word format shared by the unit and the codec
    pub format: QFormat,

    /// Micro-rotations per operation
    pub iterations: usize,

    /// Absolute tolerance for output comparison
    pub tolerance: f64,

    /// Clock edges to wait for `done` before timing out
    pub max_cycles: u64,

    /// Clock edges reset is held asserted
    pub reset_hold_cycles: u32,

    /// Pre-rotate out-of-domain vectors instead of skipping them
    pub quadrant_correction: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            // K * |v| for |v| <= 2*sqrt(2) and angles up to ~4.9 rad fit Q3.28
            format: QFormat::Q3_28,
            iterations: 16,
            tolerance: 1e-3,
            max_cycles: 1000,
            reset_hold_cycles: 1,
            quadrant_correction: true,
        }
    }
}

impl HarnessConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> UnitResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> UnitResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading harness configuration");
        Self::from_json_str(&text)
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> UnitResult<()> {
        if self.iterations == 0 {
            return Err(CordicError::Config("iterations must be positive".to_string()).into());
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(CordicError::Config(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            ))
            .into());
        }
        if self.max_cycles == 0 {
            return Err(CordicError::Config("max_cycles must be positive".to_string()).into());
        }
        Ok(())
    }

    /// Builder: set the word format
    pub fn format(mut self, format: QFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder: set the iteration count
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder: set the comparison tolerance
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder: set the `done` poll bound
    pub fn max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = cycles;
        self
    }

    /// Builder: set the reset hold time
    pub fn reset_hold_cycles(mut self, cycles: u32) -> Self {
        self.reset_hold_cycles = cycles;
        self
    }

    /// Builder: disable quadrant correction
    pub fn without_quadrant_correction(mut self) -> Self {
        self.quadrant_correction = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.format.to_string(), "Q3.28");
        assert_eq!(config.iterations, 16);
        assert_eq!(config.max_cycles, 1000);
        assert!(config.quadrant_correction);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            HarnessConfig::from_json_str(r#"{"iterations": 20, "format": {"m": 2, "n": 20}}"#)
                .unwrap();
        assert_eq!(config.iterations, 20);
        assert_eq!(config.format.total_bits(), 23);
        assert_eq!(config.tolerance, 1e-3);
    }

    #[test]
    fn test_invalid_json_values() {
        let err = HarnessConfig::from_json_str(r#"{"tolerance": -1.0}"#).unwrap_err();
        assert!(matches!(err, UnitError::Cordic(CordicError::Config(_))));

        let err = HarnessConfig::from_json_str(r#"{"format": {"m": 20, "n": 20}}"#).unwrap_err();
        assert!(matches!(err, UnitError::ConfigParse(_)));

        let err = HarnessConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, UnitError::ConfigParse(_)));
    }

    #[test]
    fn test_builders() {
        let config = HarnessConfig::default()
            .iterations(0)
            .max_cycles(10)
            .without_quadrant_correction();
        assert!(!config.quadrant_correction);
        assert!(config.validate().is_err());
    }
}
