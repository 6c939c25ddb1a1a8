//! Error types for the library surface.

use thiserror::Error;

/// Failures decoding the ingestion service's response.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed ingestion response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("ingestion response has no article list")]
    MissingArticles,

    #[error("ingestion service rejected the upload: {0}")]
    Rejected(String),
}

/// Failures of the durable snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot cache error: {0}")]
    Cache(#[from] cacache::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Rejected edit-session operations. Nothing in the session changes when one
/// of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("no articles to load")]
    NoArticles,

    #[error("no data loaded")]
    NoData,

    #[error("article {index} does not exist ({len} loaded)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("weighting must be between 0 and 100, got {0}")]
    InvalidWeighting(f64),
}
