//! Error types for reactji.

use std::time::Duration;
use thiserror::Error;

/// A failed call to the Slack Web API, classified by how the caller
/// should react to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Quota exhausted. Retry the same request after `retry_after`.
    #[error("rate limited, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// The service hiccupped (`internal_error`, 5xx, dropped connection).
    #[error("transient service error: {0}")]
    Transient(String),

    /// Anything we do not know how to recover from.
    #[error("slack api error: {0}")]
    Fatal(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("cache entry already exists: {0}")]
    AlreadyCached(String),

    #[error("cache entry not found: {0}")]
    NotCached(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
