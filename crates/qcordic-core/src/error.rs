//! Error types for the fixed-point codec, LUT generator and engine

use std::io;
use thiserror::Error;

/// Result type for CORDIC numerics
pub type CordicResult<T> = Result<T, CordicError>;

/// Errors raised by the codec, the LUT generator and the engine
#[derive(Error, Debug)]
pub enum CordicError {
    /// Value does not fit the Qm.n grid under strict encoding
    #[error("Value {value} out of range for Q{m}.{n} (allowed: [{min}, {max}])")]
    Range {
        value: f64,
        m: u32,
        n: u32,
        min: f64,
        max: f64,
    },

    /// Malformed bit pattern, container word or text artifact
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid width or iteration configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input outside the convergence domain of the algorithm
    #[error("Domain error: {0}")]
    Domain(String),

    /// Reading or writing a persisted artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CordicError {
    /// Check if this error rejects a single input rather than a configuration
    pub fn is_input_error(&self) -> bool {
        matches!(self, CordicError::Range { .. } | CordicError::Domain(_))
    }
}
