//! Document store access.
//!
//! The adapter never talks to a database directly. Every read goes through
//! the [`Fetcher`] trait, which receives fully compiled native documents.

mod matcher;
mod memory;

pub use matcher::{compare_values, matches, values_equal};
pub use memory::{MemoryStore, StoreRequest};

use async_trait::async_trait;
use serde::Serialize;

use docmap_proto::{Document, NativeOptions, NativeQuery, Record};

use crate::error::Result;

/// A list fetch against one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchRequest {
    /// Collection name.
    pub collection: String,
    /// Native filter document.
    pub filter: Document,
    /// Native options document.
    pub options: NativeOptions,
    /// Optional projection (`{field: 1, ...}`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Document>,
}

impl FetchRequest {
    /// Create a request from a compiled query.
    pub fn new(collection: impl Into<String>, query: NativeQuery) -> Self {
        Self {
            collection: collection.into(),
            filter: query.filter,
            options: query.options,
            projection: None,
        }
    }

    /// Set the projection.
    pub fn with_projection(mut self, projection: Option<Document>) -> Self {
        self.projection = projection;
        self
    }
}

/// Executes native queries against a document store.
///
/// Implementations report store failures as [`Error::Fetch`](crate::Error::Fetch).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch every document matching the request, in store order.
    async fn fetch(&self, request: FetchRequest) -> Result<Vec<Record>>;

    /// Fetch the first document matching `filter`, if any.
    async fn fetch_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Record>>;

    /// Count the documents matching `filter`, honoring `skip` and `limit`.
    async fn count(&self, collection: &str, filter: Document, options: NativeOptions)
        -> Result<u64>;
}
