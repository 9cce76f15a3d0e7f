//! In-memory document store.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use docmap_proto::value::{get_path, is_truthy};
use docmap_proto::{Document, NativeOptions, Record};

use super::matcher::{matches, sort_order};
use super::{FetchRequest, Fetcher};
use crate::error::{Error, Result};

/// Identity field every document store keeps in projections by default.
const STORE_ID_FIELD: &str = "_id";

/// A request received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    /// A list fetch.
    Fetch(FetchRequest),
    /// A point fetch.
    FetchOne {
        /// Collection name.
        collection: String,
        /// Native filter document.
        filter: Document,
    },
    /// A count.
    Count {
        /// Collection name.
        collection: String,
        /// Native filter document.
        filter: Document,
    },
}

impl StoreRequest {
    /// Collection the request targeted.
    pub fn collection(&self) -> &str {
        match self {
            StoreRequest::Fetch(request) => &request.collection,
            StoreRequest::FetchOne { collection, .. } | StoreRequest::Count { collection, .. } => {
                collection
            }
        }
    }

    /// Filter the request carried.
    pub fn filter(&self) -> &Document {
        match self {
            StoreRequest::Fetch(request) => &request.filter,
            StoreRequest::FetchOne { filter, .. } | StoreRequest::Count { filter, .. } => filter,
        }
    }
}

/// A `Fetcher` over in-memory collections of JSON records.
///
/// Every request is recorded and can be inspected with [`requests`](Self::requests).
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Record>>,
    requests: Mutex<Vec<StoreRequest>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to a collection.
    pub fn insert(&self, collection: &str, record: Record) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Append records to a collection.
    pub fn insert_many(&self, collection: &str, records: impl IntoIterator<Item = Record>) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }

    /// Load collections from a JSON object of `collection -> [record, ...]`.
    pub fn load_json(&self, data: Value) -> Result<()> {
        let Value::Object(collections) = data else {
            return Err(Error::InvalidData(
                "store data must be an object of collections".to_string(),
            ));
        };

        for (collection, records) in collections {
            let Value::Array(records) = records else {
                return Err(Error::InvalidData(format!(
                    "collection {} must be an array of records",
                    collection
                )));
            };

            let mut parsed = Vec::with_capacity(records.len());
            for record in records {
                match record {
                    Value::Object(record) => parsed.push(record),
                    _ => {
                        return Err(Error::InvalidData(format!(
                            "collection {} contains a non-object record",
                            collection
                        )))
                    }
                }
            }
            self.insert_many(&collection, parsed);
        }

        Ok(())
    }

    /// Number of records stored in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Check whether a collection holds no records.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.requests.lock().clone()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    fn record(&self, request: StoreRequest) {
        self.requests.lock().push(request);
    }

    /// Matching records in store order.
    fn select(&self, collection: &str, filter: &Document) -> Vec<Record> {
        self.collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| matches(record, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn apply_options(mut records: Vec<Record>, options: &NativeOptions) -> Vec<Record> {
    let keys = options.sort_keys();
    if !keys.is_empty() {
        records.sort_by(|a, b| {
            keys.iter()
                .map(|(field, direction)| {
                    let ord = sort_order(get_path(a, field), get_path(b, field));
                    match direction {
                        docmap_proto::SortDirection::Asc => ord,
                        docmap_proto::SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let skip = options.skip.unwrap_or(0) as usize;
    let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
    records.into_iter().skip(skip).take(limit).collect()
}

/// Apply a `{field: 1}` (inclusion) or `{field: 0}` (exclusion) projection.
fn project(record: Record, projection: Option<&Document>) -> Record {
    let Some(projection) = projection.filter(|p| !p.is_empty()) else {
        return record;
    };

    let inclusive = projection
        .iter()
        .any(|(field, flag)| field != STORE_ID_FIELD && is_truthy(flag));

    if inclusive {
        record
            .into_iter()
            .filter(|(field, _)| match projection.get(field) {
                Some(flag) => is_truthy(flag),
                None => field == STORE_ID_FIELD,
            })
            .collect()
    } else {
        record
            .into_iter()
            .filter(|(field, _)| projection.get(field).map(is_truthy).unwrap_or(true))
            .collect()
    }
}

#[async_trait]
impl Fetcher for MemoryStore {
    async fn fetch(&self, request: FetchRequest) -> Result<Vec<Record>> {
        let matched = self.select(&request.collection, &request.filter);
        let records = apply_options(matched, &request.options);
        debug!(
            collection = %request.collection,
            returned = records.len(),
            "memory fetch"
        );

        let projected = records
            .into_iter()
            .map(|record| project(record, request.projection.as_ref()))
            .collect();
        self.record(StoreRequest::Fetch(request));
        Ok(projected)
    }

    async fn fetch_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Record>> {
        let found = self
            .select(collection, &filter)
            .into_iter()
            .next()
            .map(|record| project(record, projection.as_ref()));
        self.record(StoreRequest::FetchOne {
            collection: collection.to_string(),
            filter,
        });
        Ok(found)
    }

    async fn count(
        &self,
        collection: &str,
        filter: Document,
        options: NativeOptions,
    ) -> Result<u64> {
        let counted = apply_options(self.select(collection, &filter), &options).len() as u64;
        self.record(StoreRequest::Count {
            collection: collection.to_string(),
            filter,
        });
        Ok(counted)
    }
}
