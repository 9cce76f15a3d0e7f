//! `hasOne` / `hasMany` keyed by a `foreignKey` on the child.

use serde_json::Value;

use docmap_proto::value::{get_path, is_truthy, unique};
use docmap_proto::SelectionQuery;

use super::{Attachments, Batch, RelationResolver, RelationTask};
use crate::error::Result;
use crate::store::{values_equal, Fetcher};

impl<F: Fetcher + ?Sized> RelationResolver<'_, F> {
    /// Load children pointing back at their owners. With `first_only`, each
    /// owner gets its first child, or an empty list when it has none.
    pub(super) async fn load_has_many(
        &self,
        task: RelationTask<'_>,
        foreign_key: &str,
        first_only: bool,
    ) -> Result<Attachments> {
        let query = match task.batch {
            Batch::Single => {
                let owner_id = task.owner_keys.first().cloned().flatten().unwrap_or(Value::Null);
                SelectionQuery::new().with_where(foreign_key, "==", owner_id)
            }
            Batch::Many => {
                let ids = unique(
                    task.owner_keys
                        .iter()
                        .flatten()
                        .filter(|id| is_truthy(id))
                        .cloned(),
                );
                SelectionQuery::new().with_where(foreign_key, "in", Value::Array(ids))
            }
        };

        let children = self.fetch_related(task.target, query, &task.below).await?;

        let attachments = task
            .owner_keys
            .iter()
            .map(|owner_id| {
                let matched: Vec<Value> = match (task.batch, owner_id) {
                    (Batch::Single, _) => children.iter().cloned().map(Value::Object).collect(),
                    (Batch::Many, Some(owner_id)) => children
                        .iter()
                        .filter(|child| {
                            get_path(child, foreign_key).is_some_and(|fk| values_equal(fk, owner_id))
                        })
                        .cloned()
                        .map(Value::Object)
                        .collect(),
                    (Batch::Many, None) => Vec::new(),
                };

                let value = if first_only {
                    matched
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| Value::Array(Vec::new()))
                } else {
                    Value::Array(matched)
                };
                Some(value)
            })
            .collect();

        Ok(attachments)
    }
}
