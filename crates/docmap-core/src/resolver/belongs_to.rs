//! `belongsTo`: the owner holds the key of its parent.

use serde_json::Value;

use docmap_proto::value::{get_path, is_truthy, unique};
use docmap_proto::SelectionQuery;

use super::{Attachments, Batch, RelationResolver, RelationTask};
use crate::error::Result;
use crate::store::{values_equal, Fetcher};

impl<F: Fetcher + ?Sized> RelationResolver<'_, F> {
    pub(super) async fn load_belongs_to(&self, task: RelationTask<'_>) -> Result<Attachments> {
        let target_id = self.id_attribute(task.target);

        if task.batch == Batch::Single {
            // A missing or falsy key has no parent to look up.
            let Some(key) = task.owner_keys.first().cloned().flatten().filter(is_truthy) else {
                return Ok(vec![None; task.owner_keys.len()]);
            };

            let query = SelectionQuery::new().with_where(target_id, "==", key);
            let parent = self
                .fetch_related_one(task.target, query, &task.below)
                .await?;
            return Ok(vec![parent.map(Value::Object)]);
        }

        let keys = unique(
            task.owner_keys
                .iter()
                .flatten()
                .filter(|key| is_truthy(key))
                .cloned(),
        );
        let query = SelectionQuery::new().with_where(target_id, "in", Value::Array(keys));
        let parents = self.fetch_related(task.target, query, &task.below).await?;

        Ok(task
            .owner_keys
            .iter()
            .map(|key| {
                let key = key.as_ref()?;
                parents
                    .iter()
                    .find(|parent| get_path(parent, target_id).is_some_and(|id| values_equal(id, key)))
                    .cloned()
                    .map(Value::Object)
            })
            .collect())
    }
}
