//! Error types for certchain-core operations

use thiserror::Error;

/// Errors that can occur during integrity computations
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid hash length: expected {expected}, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("Empty leaf set: cannot compute fingerprint root")]
    EmptyLeafSet,

    #[error("JSON serialization error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonError(e.to_string())
    }
}

/// Result type for certchain-core operations
pub type Result<T> = std::result::Result<T, Error>;
