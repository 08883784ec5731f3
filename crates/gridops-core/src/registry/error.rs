//! Registry error type.

use thiserror::Error;

/// Failure reported by an [`RseRegistry`](super::RseRegistry).
///
/// `Duplicate` is distinguished so callers can fall back from create to update.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A distance for this (source, destination) pair already exists.
    #[error("distance from {src} to {dst} already exists")]
    Duplicate { src: String, dst: String },

    /// Curl reported an error (timeout, connection, TLS, ...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// Non-2xx response other than a duplicate.
    #[error("HTTP {status} from {url}: {detail}")]
    Http {
        url: String,
        status: u32,
        detail: String,
    },

    /// Token request was refused or returned no token.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid registry URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl RegistryError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RegistryError::Duplicate { .. })
    }
}
