//! docmap core - query compilation and relation graph resolution.
//!
//! This crate turns storage-agnostic selection queries into native document
//! store queries and eager-loads declared relations across fetched records.
//!
//! # Modules
//!
//! - [`catalog`] - Mapper and relation definitions
//! - [`query`] - Operator table, predicate compiler and options compiler
//! - [`store`] - The `Fetcher` seam and an in-memory document store
//! - [`resolver`] - Relation graph resolver
//! - [`adapter`] - `find` / `find_all` / `count` facade
//! - [`config`] - Adapter configuration

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod resolver;
pub mod store;

pub use adapter::{Adapter, Fields, FindOptions};
pub use catalog::{Catalog, MapperDef, RelationDef, RelationKind, RelationType};
pub use config::{AdapterConfig, PrunePolicy};
pub use error::{BoxError, Error, Result};
pub use query::{compile, compile_filter, compile_options, Operator};
pub use resolver::RelationResolver;
pub use store::{FetchRequest, Fetcher, MemoryStore, StoreRequest};

/// Re-export protocol types.
pub use docmap_proto as proto;
