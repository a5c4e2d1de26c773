use thiserror::Error;

/// Contract-level failures.
///
/// Verification mismatches (wrong hash, revoked status) are verdicts, not
/// errors; everything here aborts the transaction that raised it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Certificate already exists: {0}")]
    AlreadyExists(String),

    #[error("Certificate not found: {0}")]
    NotFound(String),

    #[error("Certificate already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Commit conflict: {0}")]
    CommitConflict(String),

    #[error("Proof extraction failed: {0}")]
    ProofExtractionFailed(#[from] certchain_proof::Error),

    #[error("Integrity error: {0}")]
    Core(#[from] certchain_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;
