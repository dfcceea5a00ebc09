//! Error types for pailstore operations
//!
//! All pailstore errors are represented by the PailError enum. Expected
//! outcomes like a missing key are signaled through `Option`/`bool` returns
//! on the store itself, never through this type.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Pailstore error types with detailed context
#[derive(Debug, Clone)]
pub enum PailError {
    /// I/O operation failed
    Io {
        /// The file path where the error occurred
        path: Option<PathBuf>,
        /// The underlying I/O error kind
        kind: std::io::ErrorKind,
        /// Human-readable description
        message: String,
    },

    /// Store configuration failed validation
    InvalidConfig {
        /// Which parameter was rejected and why
        reason: String,
    },
}

impl fmt::Display for PailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PailError::Io { path, kind, message } => {
                if let Some(path) = path {
                    write!(f, "I/O error in {}: {} ({})", path.display(), message, kind)
                } else {
                    write!(f, "I/O error: {} ({})", message, kind)
                }
            }

            PailError::InvalidConfig { reason } => {
                write!(f, "Invalid store configuration: {}", reason)
            }
        }
    }
}

impl Error for PailError {}

/// Convert std::io::Error to PailError::Io
impl From<std::io::Error> for PailError {
    fn from(err: std::io::Error) -> Self {
        PailError::Io {
            path: None,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for pailstore operations
pub type PailResult<T> = Result<T, PailError>;
