//! Adapter configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use docmap_proto::PrunePolicy;

/// Default identity field of a mapper.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Configuration for an [`Adapter`](crate::Adapter) and its resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterConfig {
    /// How eager-load entries that do not continue a matched path are
    /// handed to the next level.
    pub prune_policy: PrunePolicy,

    /// Identity field used by mappers that do not declare one.
    pub default_id_attribute: String,
}

impl AdapterConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            prune_policy: PrunePolicy::default(),
            default_id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
        }
    }

    /// Set the eager-load pruning policy.
    pub fn with_prune_policy(mut self, policy: PrunePolicy) -> Self {
        self.prune_policy = policy;
        self
    }

    /// Set the default identity field.
    pub fn with_default_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.default_id_attribute = attribute.into();
        self
    }

    /// Load a configuration from JSON text. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.prune_policy, PrunePolicy::BlankUnmatched);
        assert_eq!(config.default_id_attribute, "id");
    }

    #[test]
    fn test_from_json_partial() {
        let config = AdapterConfig::from_json(r#"{"prunePolicy": "drop_unmatched"}"#).unwrap();
        assert_eq!(config.prune_policy, PrunePolicy::DropUnmatched);
        assert_eq!(config.default_id_attribute, "id");

        let config = AdapterConfig::from_json(r#"{"defaultIdAttribute": "_id"}"#).unwrap();
        assert_eq!(config.default_id_attribute, "_id");
    }

    #[test]
    fn test_builder() {
        let config = AdapterConfig::new()
            .with_prune_policy(PrunePolicy::DropUnmatched)
            .with_default_id_attribute("key");
        assert_eq!(config.prune_policy, PrunePolicy::DropUnmatched);
        assert_eq!(config.default_id_attribute, "key");
    }
}
