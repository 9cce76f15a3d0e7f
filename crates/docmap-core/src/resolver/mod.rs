//! Relation graph resolver.
//!
//! Given records that were already fetched for a mapper, the resolver walks the
//! mapper's declared relations and eager-loads every relation selected by the
//! eager-load list. Each relation issues one secondary fetch for the whole batch
//! of owners, recurses into the fetched records with the pruned list, and then
//! attaches the results to the owners.
//!
//! Sibling relations of one level are fetched concurrently. Relation tasks only
//! read owner keys up front and return their attachments; the level applies
//! them once every sibling has completed.

mod belongs_to;
mod foreign_keys;
mod has_many;
mod local_keys;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, trace, warn};

use docmap_proto::value::{get_path, set_path};
use docmap_proto::{EagerLoad, Record, SelectionQuery};

use crate::catalog::{Catalog, MapperDef, RelationDef, RelationKind};
use crate::config::AdapterConfig;
use crate::error::Result;
use crate::query;
use crate::store::{FetchRequest, Fetcher};

/// Per-owner values to attach, aligned with the owner records. `None` leaves
/// the owner untouched.
type Attachments = Vec<Option<Value>>;

/// Shape of the owner batch at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Batch {
    /// One record; relations use single-owner queries.
    Single,
    /// Any number of records; relations use batched queries.
    Many,
}

/// Everything a relation handler needs, detached from the owner records.
struct RelationTask<'r> {
    relation: &'r RelationDef,
    target: &'r MapperDef,
    kind: RelationKind,
    /// Per-owner value of the field the relation keys on.
    owner_keys: Vec<Option<Value>>,
    below: EagerLoad,
    batch: Batch,
}

/// Eager-loads declared relations through a [`Fetcher`].
pub struct RelationResolver<'a, F: ?Sized> {
    catalog: &'a Catalog,
    fetcher: &'a F,
    config: &'a AdapterConfig,
}

impl<'a, F: Fetcher + ?Sized> RelationResolver<'a, F> {
    /// Create a resolver.
    pub fn new(catalog: &'a Catalog, fetcher: &'a F, config: &'a AdapterConfig) -> Self {
        Self {
            catalog,
            fetcher,
            config,
        }
    }

    /// Eager-load relations of a single record.
    pub async fn resolve_one(
        &self,
        mapper: &MapperDef,
        record: &mut Record,
        with: &EagerLoad,
    ) -> Result<()> {
        self.resolve_level(mapper, std::slice::from_mut(record), with.clone(), Batch::Single)
            .await
    }

    /// Eager-load relations of a batch of records.
    pub async fn resolve_many(
        &self,
        mapper: &MapperDef,
        records: &mut [Record],
        with: &EagerLoad,
    ) -> Result<()> {
        self.resolve_level(mapper, records, with.clone(), Batch::Many)
            .await
    }

    fn resolve_level<'s>(
        &'s self,
        mapper: &'s MapperDef,
        records: &'s mut [Record],
        with: EagerLoad,
        batch: Batch,
    ) -> BoxFuture<'s, Result<()>> {
        async move {
            if records.is_empty() || with.is_exhausted() {
                return Ok(());
            }

            let owner_id = mapper.id_attribute_or(&self.config.default_id_attribute);
            let mut tasks = Vec::new();

            for relation in &mapper.relations {
                let Some(matched) = with.matched(&relation.relation, &relation.local_field) else {
                    continue;
                };

                let target = self.catalog.target(relation)?;
                let Some(kind) = relation.kind() else {
                    warn!(
                        mapper = %mapper.name,
                        relation = %relation.relation,
                        "relation declares no usable key, skipping"
                    );
                    continue;
                };

                let below = with.descend(matched, self.config.prune_policy);
                trace!(
                    relation = %relation.relation,
                    matched,
                    below = ?below.entries(),
                    "pruned eager-load list"
                );

                let key_field = match &kind {
                    RelationKind::BelongsTo { key } => key.as_str(),
                    RelationKind::HasManyLocalKeys { local_keys } => local_keys.as_str(),
                    RelationKind::HasOneForeignKey { .. }
                    | RelationKind::HasManyForeignKey { .. }
                    | RelationKind::HasManyForeignKeys { .. } => owner_id,
                };
                let owner_keys = records
                    .iter()
                    .map(|record| get_path(record, key_field).cloned())
                    .collect();

                debug!(
                    mapper = %mapper.name,
                    relation = %relation.relation,
                    kind = kind.label(),
                    owners = records.len(),
                    "dispatching relation"
                );

                tasks.push(self.load(RelationTask {
                    relation,
                    target,
                    kind,
                    owner_keys,
                    below,
                    batch,
                }));
            }

            let loaded = try_join_all(tasks).await?;

            for (relation, attachments) in loaded {
                for (record, attachment) in records.iter_mut().zip(attachments) {
                    if let Some(value) = attachment {
                        set_path(record, &relation.local_field, value);
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }

    /// Run one relation task, dispatching on its kind.
    async fn load<'r>(&self, task: RelationTask<'r>) -> Result<(&'r RelationDef, Attachments)> {
        let relation = task.relation;
        let attachments = match task.kind.clone() {
            RelationKind::BelongsTo { .. } => self.load_belongs_to(task).await?,
            RelationKind::HasOneForeignKey { foreign_key } => {
                self.load_has_many(task, &foreign_key, true).await?
            }
            RelationKind::HasManyForeignKey { foreign_key } => {
                self.load_has_many(task, &foreign_key, false).await?
            }
            RelationKind::HasManyLocalKeys { .. } => self.load_local_keys(task).await?,
            RelationKind::HasManyForeignKeys { foreign_keys } => {
                self.load_foreign_keys(task, &foreign_keys).await?
            }
        };
        Ok((relation, attachments))
    }

    /// Identity field of a mapper.
    fn id_attribute<'m>(&'m self, mapper: &'m MapperDef) -> &'m str {
        mapper.id_attribute_or(&self.config.default_id_attribute)
    }

    /// List-fetch related records and resolve the level below them.
    async fn fetch_related(
        &self,
        target: &MapperDef,
        query: SelectionQuery,
        below: &EagerLoad,
    ) -> Result<Vec<Record>> {
        let native = query::compile(&query);
        let collection = target.collection_name(None);
        debug!(collection = %collection, filter = ?native.filter, "fetching related records");

        let mut related = self
            .fetcher
            .fetch(FetchRequest::new(collection, native))
            .await?;
        self.resolve_level(target, &mut related, below.clone(), Batch::Many)
            .await?;
        Ok(related)
    }

    /// Point-fetch a related record and resolve the level below it.
    async fn fetch_related_one(
        &self,
        target: &MapperDef,
        query: SelectionQuery,
        below: &EagerLoad,
    ) -> Result<Option<Record>> {
        let filter = query::compile_filter(&query);
        let collection = target.collection_name(None);
        debug!(collection = %collection, filter = ?filter, "fetching related record");

        let Some(mut related) = self.fetcher.fetch_one(&collection, filter, None).await? else {
            return Ok(None);
        };
        self.resolve_level(
            target,
            std::slice::from_mut(&mut related),
            below.clone(),
            Batch::Single,
        )
        .await?;
        Ok(Some(related))
    }
}
