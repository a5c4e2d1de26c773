use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No proof payload found: {0}")]
    NoProofFound(String),

    #[error("Invalid proof payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, Error>;
