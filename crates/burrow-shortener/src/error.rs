use burrow_core::{CacheError, InvalidShortCode, StorageError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("alias already exists: {0}")]
    AliasTaken(String),
    #[error("no free short code found after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl ShortenerError {
    /// Whether the error comes from a failing store or cache rather than
    /// from the request itself.
    pub fn is_dependency(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Cache(_))
    }
}

impl From<InvalidShortCode> for ShortenerError {
    fn from(value: InvalidShortCode) -> Self {
        Self::InvalidRequest(value.to_string())
    }
}
