//! Selection query input and native query output types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::value::{type_name, Document};

/// Top-level keywords that are never treated as implicit equality filters.
pub const RESERVED_KEYWORDS: [&str; 6] = ["orderBy", "sort", "limit", "offset", "skip", "where"];

/// A caller-supplied filter/sort/pagination request.
///
/// The query is kept in its JSON form so that operand values and unknown
/// operator tokens pass through to the compilers untouched. Iteration order is
/// the insertion order of the input object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionQuery(Map<String, Value>);

impl SelectionQuery {
    /// Create an empty selection query (matches everything).
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a selection query from a JSON value, which must be an object.
    /// `null` is accepted as the empty query.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(Error::NotAnObject(type_name(&other))),
        }
    }

    /// Parse a selection query from JSON text.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Check whether a top-level key is a reserved keyword.
    pub fn is_reserved(key: &str) -> bool {
        RESERVED_KEYWORDS.contains(&key)
    }

    /// Get a top-level entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Add a top-level implicit equality filter (`{field: value}`).
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Add a `where` criterion (`{where: {field: {op: value}}}`).
    ///
    /// Repeated calls for the same field accumulate operators on it.
    pub fn with_where(
        mut self,
        field: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let container = self
            .0
            .entry("where")
            .or_insert_with(|| Value::Object(Map::new()));
        if !container.is_object() {
            *container = Value::Object(Map::new());
        }
        if let Value::Object(where_map) = container {
            let criteria = where_map
                .entry(field.into())
                .or_insert_with(|| Value::Object(Map::new()));
            if !criteria.is_object() {
                *criteria = Value::Object(Map::new());
            }
            if let Value::Object(ops) = criteria {
                ops.insert(op.into(), value.into());
            }
        }
        self
    }

    /// Set the ordering: a field name or a list of `[field, direction]` pairs.
    pub fn with_order_by(mut self, order: impl Into<Value>) -> Self {
        self.0.insert("orderBy".to_string(), order.into());
        self
    }

    /// Set the number of records to skip.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.0.insert("skip".to_string(), Value::from(skip));
        self
    }

    /// Set the maximum number of records to return.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.0.insert("limit".to_string(), Value::from(limit));
        self
    }
}

impl From<Map<String, Value>> for SelectionQuery {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for SelectionQuery {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Sort direction as understood by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Interpret a direction operand: `"desc"`, `"descending"` (any case) and
    /// negative numbers are descending, anything else is ascending.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s)
                if s.eq_ignore_ascii_case("desc") || s.eq_ignore_ascii_case("descending") =>
            {
                SortDirection::Desc
            }
            Value::Number(n) if n.as_f64().is_some_and(|f| f < 0.0) => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

/// The native options document: `{sort?, skip?, limit?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeOptions {
    /// Normalized ordering, `[[field, direction], ...]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    /// Number of records to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Maximum number of records to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl NativeOptions {
    /// The well-formed `[field, direction]` entries of `sort`, in order.
    ///
    /// Entries of any other shape are skipped.
    pub fn sort_keys(&self) -> Vec<(&str, SortDirection)> {
        let Some(Value::Array(entries)) = &self.sort else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Array(pair) => {
                    let field = pair.first()?.as_str()?;
                    let direction = pair
                        .get(1)
                        .map(SortDirection::from_value)
                        .unwrap_or(SortDirection::Asc);
                    Some((field, direction))
                }
                _ => None,
            })
            .collect()
    }

    /// Check whether no option is set.
    pub fn is_empty(&self) -> bool {
        self.sort.is_none() && self.skip.is_none() && self.limit.is_none()
    }
}

/// A compiled native query: filter document plus options document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeQuery {
    /// Filter document (field criteria plus optional `$or`).
    pub filter: Document,
    /// Sort and pagination options.
    pub options: NativeOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_builder_produces_expected_shape() {
        let query = SelectionQuery::new()
            .with_filter("name", "Alice")
            .with_where("age", ">", 18)
            .with_where("age", "<", 65)
            .with_order_by("name")
            .with_limit(10);

        assert_eq!(
            query.into_value(),
            json!({
                "name": "Alice",
                "where": {"age": {">": 18, "<": 65}},
                "orderBy": "name",
                "limit": 10
            })
        );
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(SelectionQuery::from_value(json!({"a": 1})).is_ok());
        assert_eq!(SelectionQuery::from_value(Value::Null).unwrap(), SelectionQuery::new());

        let err = SelectionQuery::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::NotAnObject("array")));
    }

    #[test]
    fn test_reserved_keywords() {
        for key in ["orderBy", "sort", "limit", "offset", "skip", "where"] {
            assert!(SelectionQuery::is_reserved(key));
        }
        assert!(!SelectionQuery::is_reserved("name"));
        assert!(!SelectionQuery::is_reserved("with"));
    }

    #[test]
    fn test_sort_keys() {
        let options = NativeOptions {
            sort: Some(json!([["name", "asc"], ["age", "DESC"], ["score", -1], 42])),
            ..Default::default()
        };

        assert_eq!(
            options.sort_keys(),
            vec![
                ("name", SortDirection::Asc),
                ("age", SortDirection::Desc),
                ("score", SortDirection::Desc),
            ]
        );
    }

    #[test]
    fn test_options_serialization_omits_absent_keys() {
        let options = NativeOptions {
            limit: Some(5),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({"limit": 5}));
        assert!(NativeOptions::default().is_empty());
    }
}
