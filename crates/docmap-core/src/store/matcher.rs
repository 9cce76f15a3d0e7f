//! Native filter evaluation against in-memory records.

use std::cmp::Ordering;

use serde_json::{Map, Value};
use tracing::trace;

use docmap_proto::value::get_path;
use docmap_proto::{Document, Record};

use crate::query::OR_KEY;

/// Check whether a record matches a native filter document.
///
/// Bare values match by equality, or by membership when the record's field
/// is an array. Missing fields never match a comparison.
pub fn matches(record: &Record, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| {
        if key == OR_KEY {
            return match condition {
                Value::Array(terms) => terms.iter().any(|term| match term {
                    Value::Object(term) => matches(record, term),
                    _ => false,
                }),
                _ => false,
            };
        }

        let field_value = get_path(record, key);
        match condition {
            Value::Object(ops) if is_operator_document(ops) => ops
                .iter()
                .all(|(op, operand)| evaluate(field_value, op, operand)),
            expected => equals_or_contains(field_value, expected),
        }
    })
}

fn is_operator_document(doc: &Map<String, Value>) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

fn evaluate(field_value: Option<&Value>, op: &str, operand: &Value) -> bool {
    match op {
        "$eq" => equals_or_contains(field_value, operand),
        "$ne" => !equals_or_contains(field_value, operand),
        "$gt" => compare_any(field_value, operand, Ordering::is_gt),
        "$gte" => compare_any(field_value, operand, Ordering::is_ge),
        "$lt" => compare_any(field_value, operand, Ordering::is_lt),
        "$lte" => compare_any(field_value, operand, Ordering::is_le),
        "$in" => in_list(field_value, operand),
        "$nin" => !in_list(field_value, operand),
        other => {
            trace!(op = other, "unsupported operator never matches");
            false
        }
    }
}

fn equals_or_contains(field_value: Option<&Value>, expected: &Value) -> bool {
    match field_value {
        None => expected.is_null(),
        Some(fv) => {
            values_equal(fv, expected)
                || matches!(fv, Value::Array(items) if items.iter().any(|item| values_equal(item, expected)))
        }
    }
}

fn compare_any(field_value: Option<&Value>, operand: &Value, pred: fn(Ordering) -> bool) -> bool {
    let check = |v: &Value| compare_values(v, operand).map(pred).unwrap_or(false);
    match field_value {
        None => false,
        Some(Value::Array(items)) => items.iter().any(check),
        Some(fv) => check(fv),
    }
}

fn in_list(field_value: Option<&Value>, operand: &Value) -> bool {
    match operand {
        Value::Array(candidates) => candidates
            .iter()
            .any(|candidate| equals_or_contains(field_value, candidate)),
        _ => false,
    }
}

/// Check if two values are equal. Numbers compare by numeric value.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Compare two values, returning their ordering if comparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None, // Incompatible types
    }
}

/// Total order used for sorting: missing and null first, then numbers,
/// strings, objects, arrays and booleans.
pub(crate) fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Object(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Bool(_)) => 5,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or_else(|| rank(a).cmp(&rank(b))),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_bare_equality() {
        let record = doc(json!({"name": "Alice", "age": 30, "tags": ["a", "b"]}));

        assert!(matches(&record, &doc(json!({"name": "Alice"}))));
        assert!(matches(&record, &doc(json!({"age": 30.0}))));
        assert!(!matches(&record, &doc(json!({"name": "Bob"}))));
        assert!(matches(&record, &doc(json!({"tags": "b"}))));
        assert!(matches(&record, &doc(json!({"tags": ["a", "b"]}))));
        assert!(!matches(&record, &doc(json!({"missing": 1}))));
        assert!(matches(&record, &doc(json!({"missing": null}))));
    }

    #[test]
    fn test_comparison_operators() {
        let record = doc(json!({"score": 75}));

        assert!(matches(&record, &doc(json!({"score": {"$gt": 50, "$lte": 75}}))));
        assert!(!matches(&record, &doc(json!({"score": {"$lt": 75}}))));
        assert!(matches(&record, &doc(json!({"score": {"$ne": 10}}))));
        assert!(!matches(&record, &doc(json!({"score": {"$gt": "50"}}))));
        assert!(!matches(&record, &doc(json!({"other": {"$gte": 0}}))));
    }

    #[test]
    fn test_membership_operators() {
        let record = doc(json!({"id": 2, "groups": [7, 8]}));

        assert!(matches(&record, &doc(json!({"id": {"$in": [1, 2, 3]}}))));
        assert!(!matches(&record, &doc(json!({"id": {"$in": []}}))));
        assert!(matches(&record, &doc(json!({"id": {"$nin": [1, 3]}}))));
        assert!(matches(&record, &doc(json!({"groups": {"$in": [8]}}))));
        assert!(!matches(&record, &doc(json!({"groups": {"$nin": [8]}}))));
    }

    #[test]
    fn test_or_group() {
        let record = doc(json!({"name": "A", "city": "X"}));

        assert!(matches(&record, &doc(json!({"$or": [{"name": "B"}, {"city": "X"}]}))));
        assert!(!matches(&record, &doc(json!({"$or": [{"name": "B"}, {"city": "Y"}]}))));
        assert!(!matches(&record, &doc(json!({"$or": []}))));
    }

    #[test]
    fn test_sub_document_equality() {
        let record = doc(json!({"meta": {"kind": "x"}}));
        assert!(matches(&record, &doc(json!({"meta": {"kind": "x"}}))));
        assert!(matches(&record, &doc(json!({"meta.kind": "x"}))));
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(sort_order(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(sort_order(Some(&json!(2)), Some(&json!(1))), Ordering::Greater);
        assert_eq!(sort_order(Some(&json!("a")), Some(&json!(1))), Ordering::Greater);
        assert_eq!(sort_order(Some(&json!(null)), None), Ordering::Equal);
    }
}
