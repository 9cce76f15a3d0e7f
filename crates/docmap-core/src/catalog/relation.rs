//! Relation definitions between mappers.

use serde::{Deserialize, Serialize};

/// Declared relation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    /// The owner holds the key of a single related record.
    BelongsTo,
    /// A single related record points back at the owner.
    HasOne,
    /// Many related records belong to the owner.
    HasMany,
}

/// A relation declared on an owning mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDef {
    /// Relation type.
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    /// Name of the target mapper.
    pub relation: String,
    /// Field (possibly dotted) on the owner where related data is attached.
    pub local_field: String,
    /// Key field: on the owner for `belongsTo`, on the child otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// Legacy name for the owner-side key of a `belongsTo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_key: Option<String>,
    /// Field on the owner listing related ids (array or map).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_keys: Option<String>,
    /// Array field on the related record holding owner ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<String>,
}

/// How a relation is resolved, derived once from its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// Key on the owner, matched against the target identity.
    BelongsTo { key: String },
    /// Key on the child, first match attached.
    HasOneForeignKey { foreign_key: String },
    /// Key on the child, all matches attached.
    HasManyForeignKey { foreign_key: String },
    /// Ids listed on the owner.
    HasManyLocalKeys { local_keys: String },
    /// Owner id contained in an array field of the child.
    HasManyForeignKeys { foreign_keys: String },
}

impl RelationKind {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo { .. } => "belongsTo",
            RelationKind::HasOneForeignKey { .. } => "hasOne",
            RelationKind::HasManyForeignKey { .. } => "hasMany",
            RelationKind::HasManyLocalKeys { .. } => "hasMany(localKeys)",
            RelationKind::HasManyForeignKeys { .. } => "hasMany(foreignKeys)",
        }
    }
}

impl RelationDef {
    fn new(
        relation_type: RelationType,
        relation: impl Into<String>,
        local_field: impl Into<String>,
    ) -> Self {
        Self {
            relation_type,
            relation: relation.into(),
            local_field: local_field.into(),
            foreign_key: None,
            local_key: None,
            local_keys: None,
            foreign_keys: None,
        }
    }

    /// Create a `belongsTo` relation keyed by `foreign_key` on the owner.
    pub fn belongs_to(
        relation: impl Into<String>,
        local_field: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(RelationType::BelongsTo, relation, local_field);
        def.foreign_key = Some(foreign_key.into());
        def
    }

    /// Create a `hasOne` relation keyed by `foreign_key` on the child.
    pub fn has_one(
        relation: impl Into<String>,
        local_field: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(RelationType::HasOne, relation, local_field);
        def.foreign_key = Some(foreign_key.into());
        def
    }

    /// Create a `hasMany` relation keyed by `foreign_key` on the child.
    pub fn has_many(
        relation: impl Into<String>,
        local_field: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(RelationType::HasMany, relation, local_field);
        def.foreign_key = Some(foreign_key.into());
        def
    }

    /// Create a `hasMany` relation whose ids are listed on the owner.
    pub fn has_many_local_keys(
        relation: impl Into<String>,
        local_field: impl Into<String>,
        local_keys: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(RelationType::HasMany, relation, local_field);
        def.local_keys = Some(local_keys.into());
        def
    }

    /// Create a `hasMany` relation whose children list owner ids.
    pub fn has_many_foreign_keys(
        relation: impl Into<String>,
        local_field: impl Into<String>,
        foreign_keys: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(RelationType::HasMany, relation, local_field);
        def.foreign_keys = Some(foreign_keys.into());
        def
    }

    /// Set the legacy owner-side key.
    pub fn with_local_key(mut self, local_key: impl Into<String>) -> Self {
        self.local_key = Some(local_key.into());
        self
    }

    /// Derive the resolution strategy.
    ///
    /// Returns `None` for definitions that name no usable key.
    pub fn kind(&self) -> Option<RelationKind> {
        use RelationType::*;

        match (self.relation_type, &self.foreign_key) {
            (HasOne, Some(fk)) => {
                return Some(RelationKind::HasOneForeignKey {
                    foreign_key: fk.clone(),
                })
            }
            (HasMany, Some(fk)) => {
                return Some(RelationKind::HasManyForeignKey {
                    foreign_key: fk.clone(),
                })
            }
            _ => {}
        }

        if self.relation_type == HasMany {
            if let Some(local_keys) = &self.local_keys {
                return Some(RelationKind::HasManyLocalKeys {
                    local_keys: local_keys.clone(),
                });
            }
            if let Some(foreign_keys) = &self.foreign_keys {
                return Some(RelationKind::HasManyForeignKeys {
                    foreign_keys: foreign_keys.clone(),
                });
            }
        }

        let owner_key = match self.relation_type {
            BelongsTo => self.foreign_key.as_ref().or(self.local_key.as_ref()),
            HasOne => self.local_key.as_ref(),
            HasMany => None,
        };

        owner_key.map(|key| RelationKind::BelongsTo { key: key.clone() })
    }
}
