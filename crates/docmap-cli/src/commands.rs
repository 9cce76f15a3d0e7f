//! Command implementations.

use std::fs;

use anyhow::Context;
use serde_json::Value;
use tracing::info;

use docmap_core::{compile, Adapter, AdapterConfig, Catalog, Fields, FindOptions, MemoryStore};
use docmap_proto::SelectionQuery;

use crate::args::FindArgs;

/// Compile a JSON selection query into `{filter, options}`.
pub fn compile_query(query: &str) -> anyhow::Result<Value> {
    let query = SelectionQuery::from_json(query).context("parsing selection query")?;
    Ok(serde_json::to_value(compile(&query))?)
}

/// Load fixtures, run `find_all` and return the resolved records.
pub async fn find(args: &FindArgs) -> anyhow::Result<Value> {
    let schema = fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema {}", args.schema.display()))?;
    let catalog = Catalog::from_json(&schema).context("loading schema")?;

    let data = fs::read_to_string(&args.data)
        .with_context(|| format!("reading data {}", args.data.display()))?;
    let store = MemoryStore::new();
    store
        .load_json(serde_json::from_str(&data)?)
        .context("loading data")?;

    let query = match &args.query {
        Some(text) => SelectionQuery::from_json(text).context("parsing selection query")?,
        None => SelectionQuery::new(),
    };

    let mut opts = args
        .with
        .iter()
        .fold(FindOptions::new(), |opts, path| opts.with_relation(path.clone()));
    if !args.fields.is_empty() {
        opts = opts.with_fields(Fields::Many(args.fields.clone()));
    }

    let adapter = Adapter::new(catalog, store).with_config(AdapterConfig::from(args));
    let records = adapter.find_all(&args.mapper, &query, &opts).await?;
    info!(
        mapper = %args.mapper,
        records = records.len(),
        requests = adapter.fetcher().requests().len(),
        "resolved record graph"
    );

    Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
}
