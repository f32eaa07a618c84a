//! Unit-under-test error types

use std::io;

use qcordic_core::CordicError;
use thiserror::Error;

/// Result type for unit and harness operations
pub type UnitResult<T> = Result<T, UnitError>;

/// Errors that can occur while driving a CORDIC unit
#[derive(Error, Debug)]
pub enum UnitError {
    /// `done` was not asserted within the poll bound
    #[error("Unit '{unit}' did not assert done within {cycles} clock cycles")]
    Timeout { unit: String, cycles: u64 },

    /// Handshake used out of order or unit in an unexpected state
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid register offset
    #[error("Invalid register offset: 0x{0:02x}")]
    InvalidRegister(usize),

    /// Operation not supported by this unit
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Harness configuration could not be read
    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[from] io::Error),

    /// Harness configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Codec, table or engine failure
    #[error(transparent)]
    Cordic(#[from] CordicError),
}

impl UnitError {
    /// Check if this error is recoverable by resetting the unit
    pub fn is_recoverable(&self) -> bool {
        matches!(self, UnitError::Timeout { .. } | UnitError::Protocol(_))
    }

    /// Check if this error only rejects the current test vector
    pub fn is_input_error(&self) -> bool {
        matches!(self, UnitError::Cordic(e) if e.is_input_error())
    }
}
