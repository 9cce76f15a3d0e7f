//! JSON value helpers shared by the compilers and the resolver.
//!
//! Records and native documents are plain `serde_json` objects. These helpers
//! give them the loose semantics a document store expects: truthiness, dotted
//! field paths and order-preserving de-duplication.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// A record as returned by the document store.
pub type Record = Map<String, Value>;

/// A native filter, projection or sub-document.
pub type Document = Map<String, Value>;

/// Loose truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Short name of a value's JSON type, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a value at a dotted path (`"profile.address.city"`).
///
/// Array elements are addressed by numeric segments.
pub fn get_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Write a value at a dotted path, creating intermediate objects as needed.
///
/// A non-object value sitting on an intermediate segment is replaced by an
/// empty object.
pub fn set_path(record: &mut Record, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            record.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = record
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

/// Remove duplicate values, keeping the first occurrence of each.
pub fn unique(values: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.to_string()))
        .collect()
}

/// Coerce a pagination value (`skip`, `offset`, `limit`) to a count.
///
/// Numbers are truncated toward zero; numeric strings are parsed; `true` is 1.
/// Negative, non-finite and non-numeric values yield `None`.
pub fn coerce_count(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return Some(u);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(true) => 1.0,
        _ => return None,
    };

    if number.is_finite() && number >= 0.0 {
        Some(number.trunc() as u64)
    } else {
        None
    }
}
