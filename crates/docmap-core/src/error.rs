//! Core error types.

use serde_json::Value;
use thiserror::Error;

/// Boxed error produced by a `Fetcher` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core adapter errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] docmap_proto::Error),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A relation configuration the resolver cannot execute.
    #[error("unsupported configuration: {0}")]
    Unsupported(String),

    /// A mapper name that is not registered in the catalog.
    #[error("unknown mapper: {0}")]
    UnknownMapper(String),

    /// A point fetch found no document.
    #[error("record not found in {collection}: {id}")]
    NotFound {
        /// Collection that was queried.
        collection: String,
        /// Identity value that was looked up.
        id: Value,
    },

    /// The document store failed.
    #[error("fetch error: {0}")]
    Fetch(#[source] BoxError),

    /// Invalid schema or record data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Wrap a document store failure.
    pub fn fetch(err: impl Into<BoxError>) -> Self {
        Error::Fetch(err.into())
    }
}
