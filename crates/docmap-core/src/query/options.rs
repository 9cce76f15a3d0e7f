//! Options compiler: sort and pagination directives.

use serde_json::Value;

use docmap_proto::value::{coerce_count, is_truthy};
use docmap_proto::{NativeOptions, SelectionQuery};

/// Direction implied by a bare field name.
const DEFAULT_DIRECTION: &str = "asc";

/// Compile the sort/skip/limit directives of a selection query.
///
/// `orderBy` wins over `sort` and `skip` over `offset` when both are truthy.
/// Falsy values (including zero) are treated as absent.
pub fn compile_options(query: &SelectionQuery) -> NativeOptions {
    let order = first_truthy(query, "orderBy", "sort");
    let skip = first_truthy(query, "skip", "offset");
    let limit = query.get("limit").filter(|v| is_truthy(v));

    NativeOptions {
        sort: order.map(normalize_order),
        skip: skip.and_then(coerce_count),
        limit: limit.and_then(coerce_count),
    }
}

fn first_truthy<'a>(query: &'a SelectionQuery, primary: &str, fallback: &str) -> Option<&'a Value> {
    query
        .get(primary)
        .filter(|v| is_truthy(v))
        .or_else(|| query.get(fallback).filter(|v| is_truthy(v)))
}

/// Normalize an ordering into `[[field, direction], ...]`.
///
/// Entries that are neither strings nor pairs are passed through untouched.
fn normalize_order(order: &Value) -> Value {
    match order {
        Value::String(field) => Value::Array(vec![order_pair(field)]),
        Value::Array(entries) => Value::Array(
            entries
                .iter()
                .map(|entry| match entry {
                    Value::String(field) => order_pair(field),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn order_pair(field: &str) -> Value {
    Value::Array(vec![
        Value::String(field.to_string()),
        Value::String(DEFAULT_DIRECTION.to_string()),
    ])
}
