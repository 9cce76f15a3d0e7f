//! Protocol error types.

use thiserror::Error;

/// Errors raised while building IR types from caller input.
#[derive(Debug, Error)]
pub enum Error {
    /// A selection query must be a JSON object.
    #[error("selection query must be an object, got {0}")]
    NotAnObject(&'static str),

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
