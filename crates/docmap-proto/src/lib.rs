//! docmap protocol types.
//!
//! This crate defines the storage-agnostic request types a caller hands to the
//! adapter and the native (document store) query types the compilers produce.
//!
//! # Modules
//!
//! - [`query`] - Selection queries and compiled native queries
//! - [`include`] - Eager-load lists and pruning
//! - [`value`] - JSON value helpers (truthiness, dotted paths, de-duplication)
//! - [`error`] - Protocol error types

pub mod error;
pub mod include;
pub mod query;
pub mod value;

pub use error::Error;

pub use include::{EagerLoad, PrunePolicy};
pub use query::{
    NativeOptions, NativeQuery, SelectionQuery, SortDirection, RESERVED_KEYWORDS,
};
pub use value::{Document, Record};
