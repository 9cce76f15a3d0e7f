//! `hasMany` via `localKeys`: the owner lists the ids of its related records.

use serde_json::Value;

use docmap_proto::value::{get_path, is_truthy, unique};
use docmap_proto::SelectionQuery;

use super::{Attachments, Batch, RelationResolver, RelationTask};
use crate::error::Result;
use crate::store::{values_equal, Fetcher};

/// Ids listed by one owner. A map contributes its keys.
fn listed_keys(container: Option<&Value>) -> Vec<Value> {
    match container {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => map.keys().cloned().map(Value::String).collect(),
        _ => Vec::new(),
    }
}

impl<F: Fetcher + ?Sized> RelationResolver<'_, F> {
    pub(super) async fn load_local_keys(&self, task: RelationTask<'_>) -> Result<Attachments> {
        let target_id = self.id_attribute(task.target);
        let per_owner: Vec<Vec<Value>> = task
            .owner_keys
            .iter()
            .map(|container| listed_keys(container.as_ref()))
            .collect();

        let keys: Vec<Value> = unique(per_owner.iter().flatten().cloned())
            .into_iter()
            .filter(is_truthy)
            .collect();
        let query = SelectionQuery::new().with_where(target_id, "in", Value::Array(keys));
        let related = self.fetch_related(task.target, query, &task.below).await?;

        if task.batch == Batch::Single {
            let all = related.into_iter().map(Value::Object).collect();
            return Ok(vec![Some(Value::Array(all))]);
        }

        Ok(per_owner
            .iter()
            .map(|own_keys| {
                let attached = related
                    .iter()
                    .filter(|record| {
                        get_path(record, target_id)
                            .is_some_and(|id| own_keys.iter().any(|key| values_equal(key, id)))
                    })
                    .cloned()
                    .map(Value::Object)
                    .collect();
                Some(Value::Array(attached))
            })
            .collect())
    }
}
