use thiserror::Error;

/// Errors surfaced by the engine and its storage handle.
#[derive(Error, Debug)]
pub enum Error {
    /// A required text argument was absent.
    #[error("invalid argument: {0} must be provided")]
    InvalidArgument(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl Error {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
