//! Adapter facade: compile, fetch, then eager-load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use docmap_proto::{Document, EagerLoad, Record, SelectionQuery};

use crate::catalog::{Catalog, MapperDef};
use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::query;
use crate::resolver::RelationResolver;
use crate::store::{FetchRequest, Fetcher};

/// Field selection: one field name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fields {
    /// A single field.
    One(String),
    /// Several fields.
    Many(Vec<String>),
}

impl Fields {
    /// Projection document `{field: 1, ...}`.
    pub fn to_projection(&self) -> Document {
        let names: &[String] = match self {
            Fields::One(name) => std::slice::from_ref(name),
            Fields::Many(names) => names,
        };
        names
            .iter()
            .map(|name| (name.clone(), Value::from(1)))
            .collect::<Map<String, Value>>()
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// Relations to eager-load.
    #[serde(default)]
    pub with: EagerLoad,
    /// Fields to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Fields>,
    /// Collection override for the root mapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl FindOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Eager-load a relation name or dotted path.
    pub fn with_relation(mut self, path: impl Into<String>) -> Self {
        self.with = self.with.with(path);
        self
    }

    /// Restrict the returned fields.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Override the root collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    fn projection(&self) -> Option<Document> {
        self.fields.as_ref().map(Fields::to_projection)
    }
}

/// Record-mapper adapter over a document store.
pub struct Adapter<F> {
    catalog: Catalog,
    fetcher: F,
    config: AdapterConfig,
}

impl<F: Fetcher> Adapter<F> {
    /// Create an adapter with the default configuration.
    pub fn new(catalog: Catalog, fetcher: F) -> Self {
        Self {
            catalog,
            fetcher,
            config: AdapterConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// The mapper catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The active configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// A resolver sharing this adapter's catalog, fetcher and configuration.
    pub fn resolver(&self) -> RelationResolver<'_, F> {
        RelationResolver::new(&self.catalog, &self.fetcher, &self.config)
    }

    fn id_attribute<'m>(&'m self, mapper: &'m MapperDef) -> &'m str {
        mapper.id_attribute_or(&self.config.default_id_attribute)
    }

    /// Fetch one record by identity and eager-load `opts.with` on it.
    #[instrument(skip_all, fields(mapper = %mapper, id = %id))]
    pub async fn find(&self, mapper: &str, id: Value, opts: &FindOptions) -> Result<Record> {
        let def = self.catalog.mapper(mapper)?;
        let collection = def.collection_name(opts.collection.as_deref());
        let query = SelectionQuery::new().with_where(self.id_attribute(def), "==", id.clone());
        let filter = query::compile_filter(&query);

        let mut record = self
            .fetcher
            .fetch_one(&collection, filter, opts.projection())
            .await?
            .ok_or(Error::NotFound { collection, id })?;

        self.resolver().resolve_one(def, &mut record, &opts.with).await?;
        Ok(record)
    }

    /// Fetch every record matching `query` and eager-load `opts.with` on them.
    #[instrument(skip_all, fields(mapper = %mapper))]
    pub async fn find_all(
        &self,
        mapper: &str,
        query: &SelectionQuery,
        opts: &FindOptions,
    ) -> Result<Vec<Record>> {
        let def = self.catalog.mapper(mapper)?;
        let collection = def.collection_name(opts.collection.as_deref());
        let native = query::compile(query);
        debug!(collection = %collection, filter = ?native.filter, options = ?native.options, "compiled query");

        let request = FetchRequest::new(collection, native).with_projection(opts.projection());
        let mut records = self.fetcher.fetch(request).await?;
        debug!(count = records.len(), "fetched records");

        self.resolver()
            .resolve_many(def, &mut records, &opts.with)
            .await?;
        Ok(records)
    }

    /// Count the records matching `query`.
    #[instrument(skip_all, fields(mapper = %mapper))]
    pub async fn count(
        &self,
        mapper: &str,
        query: &SelectionQuery,
        opts: &FindOptions,
    ) -> Result<u64> {
        let def = self.catalog.mapper(mapper)?;
        let collection = def.collection_name(opts.collection.as_deref());
        let native = query::compile(query);

        self.fetcher
            .count(&collection, native.filter, native.options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RelationDef;
    use crate::store::{MemoryStore, StoreRequest};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn adapter() -> Adapter<MemoryStore> {
        let catalog = Catalog::new()
            .with_mapper(
                MapperDef::new("User").with_relation(RelationDef::has_many("Post", "posts", "userId")),
            )
            .with_mapper(MapperDef::new("Post").with_table("posts"));

        let store = MemoryStore::new();
        store
            .load_json(json!({
                "user": [{"id": 1, "name": "Ann", "email": "ann@example.com"}],
                "posts": [
                    {"id": 10, "userId": 1, "title": "a"},
                    {"id": 11, "userId": 1, "title": "b"}
                ]
            }))
            .unwrap();

        Adapter::new(catalog, store)
    }

    #[tokio::test]
    async fn test_find_with_relation() {
        let adapter = adapter();
        let opts = FindOptions::new().with_relation("posts");

        let user = adapter.find("User", json!(1), &opts).await.unwrap();
        assert_eq!(user["posts"].as_array().unwrap().len(), 2);

        let requests = adapter.fetcher().requests();
        assert_eq!(requests[0].collection(), "user");
        assert_eq!(requests[1].collection(), "posts");
        assert_eq!(Value::Object(requests[1].filter().clone()), json!({"userId": 1}));
    }

    #[tokio::test]
    async fn test_find_not_found() {
        let adapter = adapter();
        let err = adapter
            .find("User", json!(99), &FindOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { ref collection, ref id } if collection == "user" && *id == json!(99)));
    }

    #[tokio::test]
    async fn test_find_all_with_projection_and_override() {
        let adapter = adapter();
        let opts = FindOptions::new()
            .with_fields(Fields::Many(vec!["title".into()]))
            .with_collection("posts");

        let records = adapter
            .find_all("User", &SelectionQuery::new().with_filter("userId", 1), &opts)
            .await
            .unwrap();

        assert_eq!(
            records.into_iter().map(Value::Object).collect::<Vec<_>>(),
            vec![json!({"title": "a"}), json!({"title": "b"})]
        );
        assert!(matches!(&adapter.fetcher().requests()[0], StoreRequest::Fetch(r) if r.collection == "posts"));
    }

    #[tokio::test]
    async fn test_count() {
        let adapter = adapter();
        let query = SelectionQuery::new().with_where("id", ">", 10);
        assert_eq!(adapter.count("Post", &query, &FindOptions::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_mapper() {
        let adapter = adapter();
        let err = adapter
            .find_all("Comment", &SelectionQuery::new(), &FindOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownMapper(name) if name == "Comment"));
    }

    #[test]
    fn test_fields_projection() {
        assert_eq!(
            Value::Object(Fields::One("name".into()).to_projection()),
            json!({"name": 1})
        );
        let opts: FindOptions = serde_json::from_value(json!({"with": ["posts"], "fields": ["a", "b"]})).unwrap();
        assert_eq!(Value::Object(opts.projection().unwrap()), json!({"a": 1, "b": 1}));
    }
}
