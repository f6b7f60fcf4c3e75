use thiserror::Error;

use crate::types::DocumentId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("Missing seed: ranked listings need a seed minted once per session")]
    MissingSeed,

    #[error("Index store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: document {0}")]
    NotFound(DocumentId),
}

impl Error {
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(reason.to_string())
    }

    /// Errors caused by the request itself. Retrying without correcting the
    /// request yields the same error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidPageRequest(_) | Self::MissingSeed | Self::NotFound(_))
    }

    /// Transient infrastructure failures, safe to retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
