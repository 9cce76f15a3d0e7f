//! Mapper definitions.

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};

use super::RelationDef;

/// A record mapper: a named record type stored in one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapperDef {
    /// Mapper name (unique within a catalog).
    pub name: String,
    /// Identity field. Falls back to the adapter default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_attribute: Option<String>,
    /// Explicit collection name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Alternate explicit collection name, used when `table` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Declared relations, in resolution order.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl MapperDef {
    /// Create a new mapper definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_attribute: None,
            table: None,
            collection: None,
            relations: Vec::new(),
        }
    }

    /// Set the identity field.
    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = Some(attribute.into());
        self
    }

    /// Set the collection name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a relation.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Identity field, or `default` when none is declared.
    pub fn id_attribute_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.id_attribute.as_deref().unwrap_or(default)
    }

    /// Resolve the collection name.
    ///
    /// Precedence: per-call override, `table`, `collection`, then the
    /// snake_case form of the mapper name.
    pub fn collection_name(&self, override_name: Option<&str>) -> String {
        override_name
            .or(self.table.as_deref())
            .or(self.collection.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.name.to_snake_case())
    }
}
