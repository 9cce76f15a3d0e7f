//! `hasMany` via `foreignKeys`: related records list their owners' ids.

use serde_json::Value;

use docmap_proto::SelectionQuery;

use super::{Attachments, RelationResolver, RelationTask};
use crate::error::{Error, Result};
use crate::store::Fetcher;

impl<F: Fetcher + ?Sized> RelationResolver<'_, F> {
    /// Only a single owner is supported.
    pub(super) async fn load_foreign_keys(
        &self,
        task: RelationTask<'_>,
        foreign_keys: &str,
    ) -> Result<Attachments> {
        if task.owner_keys.len() > 1 {
            return Err(Error::Unsupported(format!(
                "hasMany {} via foreignKeys \"{}\" across {} records",
                task.relation.relation,
                foreign_keys,
                task.owner_keys.len()
            )));
        }

        let owner_id = task.owner_keys.first().cloned().flatten().unwrap_or(Value::Null);
        let query = SelectionQuery::new().with_where(foreign_keys, "contains", owner_id);
        let related = self.fetch_related(task.target, query, &task.below).await?;

        let all = related.into_iter().map(Value::Object).collect();
        Ok(vec![Some(Value::Array(all))])
    }
}
