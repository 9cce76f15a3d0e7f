//! Catalog of registered mappers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{MapperDef, RelationDef};
use crate::error::{Error, Result};

/// Serialized form of a catalog: `{"mappers": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Mapper definitions.
    #[serde(default)]
    pub mappers: Vec<MapperDef>,
}

/// Registry of mapper definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    mappers: HashMap<String, MapperDef>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper, replacing any previous one with the same name.
    pub fn with_mapper(mut self, mapper: MapperDef) -> Self {
        self.register(mapper);
        self
    }

    /// Register a mapper, replacing any previous one with the same name.
    pub fn register(&mut self, mapper: MapperDef) {
        self.mappers.insert(mapper.name.clone(), mapper);
    }

    /// Get a mapper by name.
    pub fn get(&self, name: &str) -> Option<&MapperDef> {
        self.mappers.get(name)
    }

    /// Get a mapper by name, failing with `UnknownMapper`.
    pub fn mapper(&self, name: &str) -> Result<&MapperDef> {
        self.get(name)
            .ok_or_else(|| Error::UnknownMapper(name.to_string()))
    }

    /// Get the target mapper of a relation.
    pub fn target(&self, relation: &RelationDef) -> Result<&MapperDef> {
        self.mapper(&relation.relation)
    }

    /// List registered mapper names, sorted.
    pub fn mapper_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check that every relation targets a registered mapper.
    pub fn validate(&self) -> Result<()> {
        for name in self.mapper_names() {
            let mapper = &self.mappers[name];
            for relation in &mapper.relations {
                if !self.mappers.contains_key(&relation.relation) {
                    return Err(Error::UnknownMapper(format!(
                        "{} (target of {}.{})",
                        relation.relation, mapper.name, relation.local_field
                    )));
                }
                if relation.local_field.is_empty() {
                    return Err(Error::InvalidData(format!(
                        "relation {} on {} has an empty localField",
                        relation.relation, mapper.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Load and validate a catalog from JSON schema text.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(text)?;
        let catalog = file
            .mappers
            .into_iter()
            .fold(Catalog::new(), Catalog::with_mapper);
        catalog.validate()?;
        Ok(catalog)
    }
}
