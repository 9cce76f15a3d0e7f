//! Mapper catalog.
//!
//! The catalog holds every registered mapper and the relations it declares.

mod catalog;
mod mapper;
mod relation;

pub use catalog::{Catalog, SchemaFile};
pub use mapper::MapperDef;
pub use relation::{RelationDef, RelationKind, RelationType};
