//! Error taxonomy shared by every tally crate.
//!
//! All failures derive from the single [`CalcError`] root so callers can
//! match broadly (`Err(e)`) or narrowly (`Err(CalcError::Validation { .. })`).
//! The engine and operation layers never swallow errors; the REPL decides
//! presentation, and only configuration errors are fatal.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcError>;

#[derive(Debug, Error)]
pub enum CalcError {
    /// Bad operand (not a number, out of range) or an operation-specific
    /// precondition violated (divide by zero, negative exponent, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Arithmetic fault during computation that pre-validation could not
    /// rule out (overflow, non-finite intermediate).
    #[error("computation error: {message}")]
    Computation { message: String },

    /// Registry lookup miss. Distinct from `Validation` so the REPL can
    /// suggest operation names.
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },

    /// Attempted registration of a constructor that does not produce a
    /// conforming operation.
    #[error("invalid operation type for '{name}': {message}")]
    InvalidOperationType { name: String, message: String },

    /// Malformed persisted history or snapshot data.
    #[error("invalid persisted data: {message}")]
    InvalidPersistedData { message: String },

    /// Invalid configuration at startup. Fatal; raised before any core
    /// operation is reachable.
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },
}

impl CalcError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn persisted(message: impl Into<String>) -> Self {
        Self::InvalidPersistedData {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Process exit code for the CLI. Configuration errors are fatal at
    /// startup and get their own code; everything else is print-and-continue
    /// territory and only reaches here on teardown failures.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            _ => 1,
        }
    }
}
