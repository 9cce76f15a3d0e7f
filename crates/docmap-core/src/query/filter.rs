//! Predicate compiler: selection query to native filter document.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use docmap_proto::{Document, SelectionQuery};

use super::operator::{Operator, ParsedOperator};

/// Key of the OR-group array in a native filter.
pub const OR_KEY: &str = "$or";

/// Accumulated criterion for one field.
#[derive(Debug, Clone, PartialEq)]
enum FieldCriterion {
    /// Bare equality value.
    Equals(Value),
    /// Native operator document (`{"$gt": .., "$lt": ..}`).
    Operators(Map<String, Value>),
}

impl FieldCriterion {
    fn into_value(self) -> Value {
        match self {
            FieldCriterion::Equals(value) => value,
            FieldCriterion::Operators(ops) => Value::Object(ops),
        }
    }
}

/// Compile a selection query into a native filter document.
///
/// The query is not modified. Criteria with unknown operator tokens are
/// dropped; no other input is rejected.
pub fn compile_filter(query: &SelectionQuery) -> Document {
    let mut fields: IndexMap<String, FieldCriterion> = IndexMap::new();
    let mut or_terms: Vec<Value> = Vec::new();

    for (field, criteria) in normalize(query) {
        for (token, operand) in criteria {
            let Some(ParsedOperator { operator, or_group }) = Operator::parse(&token) else {
                warn!(field = %field, token = %token, "dropping criterion with unknown operator");
                continue;
            };

            if or_group {
                let mut term = Map::new();
                term.insert(field.clone(), native_operand(operator, operand));
                or_terms.push(Value::Object(term));
            } else {
                apply(&mut fields, &field, operator, operand);
            }
        }
    }

    let mut filter: Document = fields
        .into_iter()
        .map(|(field, criterion)| (field, criterion.into_value()))
        .collect();

    if !or_terms.is_empty() {
        filter.insert(OR_KEY.to_string(), Value::Array(or_terms));
    }

    filter
}

/// Fold the sugar layer into a single ordered `field -> operator-object` list.
///
/// Explicit `where` entries come first and win over top-level entries naming
/// the same field. Literal criteria are wrapped as `{"==": literal}`.
fn normalize(query: &SelectionQuery) -> Vec<(String, Map<String, Value>)> {
    let mut criteria: IndexMap<String, Value> = IndexMap::new();

    if let Some(Value::Object(where_map)) = query.get("where") {
        for (field, value) in where_map {
            criteria.insert(field.clone(), value.clone());
        }
    }

    for (key, value) in query.as_map() {
        if SelectionQuery::is_reserved(key) || criteria.contains_key(key) {
            continue;
        }
        criteria.insert(key.clone(), value.clone());
    }

    criteria
        .into_iter()
        .map(|(field, value)| match value {
            Value::Object(ops) => (field, ops),
            literal => {
                let mut ops = Map::new();
                ops.insert("==".to_string(), literal);
                (field, ops)
            }
        })
        .collect()
}

/// Native form of a single operator/operand pair.
fn native_operand(operator: Operator, operand: Value) -> Value {
    match operator.native_key() {
        None => operand,
        Some(key) => {
            let mut doc = Map::new();
            doc.insert(key.to_string(), operand);
            Value::Object(doc)
        }
    }
}

/// Write a plain (non-OR) criterion into the field table.
fn apply(
    fields: &mut IndexMap<String, FieldCriterion>,
    field: &str,
    operator: Operator,
    operand: Value,
) {
    let Some(key) = operator.native_key() else {
        fields.insert(field.to_string(), FieldCriterion::Equals(operand));
        return;
    };

    match fields.get_mut(field) {
        Some(FieldCriterion::Operators(ops)) => {
            ops.insert(key.to_string(), operand);
        }
        _ => {
            let mut ops = Map::new();
            ops.insert(key.to_string(), operand);
            fields.insert(field.to_string(), FieldCriterion::Operators(ops));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(query: Value) -> Value {
        let query = SelectionQuery::from_value(query).unwrap();
        Value::Object(compile_filter(&query))
    }

    #[test]
    fn test_plain_operators() {
        let cases = [
            ("==", json!(1)),
            ("===", json!(1)),
            ("contains", json!(1)),
            ("!=", json!({"$ne": 1})),
            ("!==", json!({"$ne": 1})),
            ("notContains", json!({"$ne": 1})),
            (">", json!({"$gt": 1})),
            (">=", json!({"$gte": 1})),
            ("<", json!({"$lt": 1})),
            ("<=", json!({"$lte": 1})),
            ("in", json!({"$in": 1})),
            ("notIn", json!({"$nin": 1})),
        ];

        for (token, expected) in cases {
            let compiled = compile(json!({"where": {"f": {token: 1}}}));
            assert_eq!(compiled, json!({"f": expected}), "token {}", token);
        }
    }

    #[test]
    fn test_or_group_follows_declaration_order() {
        let compiled = compile(json!({
            "where": {
                "age": {">": 18},
                "name": {"|==": "A"},
                "city": {"|==": "B"}
            }
        }));

        assert_eq!(
            compiled,
            json!({"age": {"$gt": 18}, "$or": [{"name": "A"}, {"city": "B"}]})
        );
    }

    #[test]
    fn test_or_terms_are_never_merged() {
        let compiled = compile(json!({
            "where": {"a": {"|>": 1, "|<": 0}, "b": {"|in": [1, 2]}}
        }));

        assert_eq!(
            compiled,
            json!({"$or": [{"a": {"$gt": 1}}, {"a": {"$lt": 0}}, {"b": {"$in": [1, 2]}}]})
        );
    }

    #[test]
    fn test_implicit_equality_sugar() {
        let sugar = compile(json!({"name": "X"}));
        let explicit = compile(json!({"where": {"name": {"==": "X"}}}));
        assert_eq!(sugar, explicit);
        assert_eq!(sugar, json!({"name": "X"}));

        let object_sugar = compile(json!({"age": {">": 3}, "limit": 5}));
        assert_eq!(object_sugar, json!({"age": {"$gt": 3}}));
    }

    #[test]
    fn test_explicit_where_wins() {
        let compiled = compile(json!({
            "name": "top",
            "where": {"name": {"!=": "bottom"}}
        }));
        assert_eq!(compiled, json!({"name": {"$ne": "bottom"}}));
    }

    #[test]
    fn test_literal_where_criterion() {
        let compiled = compile(json!({"where": {"status": "active", "tags": ["a"]}}));
        assert_eq!(compiled, json!({"status": "active", "tags": ["a"]}));
    }

    #[test]
    fn test_operators_on_one_field_are_anded() {
        let compiled = compile(json!({"where": {"age": {">=": 18, "<": 65, "!=": 30}}}));
        assert_eq!(compiled, json!({"age": {"$gte": 18, "$lt": 65, "$ne": 30}}));
    }

    #[test]
    fn test_equality_replaces_and_comparison_replaces_bare_value() {
        let compiled = compile(json!({"where": {"age": {">": 1, "==": 5}}}));
        assert_eq!(compiled, json!({"age": 5}));

        let compiled = compile(json!({"where": {"age": {"==": 5, ">": 1}}}));
        assert_eq!(compiled, json!({"age": {"$gt": 1}}));
    }

    #[test]
    fn test_unknown_operators_are_dropped() {
        let compiled = compile(json!({"where": {"name": {"like": "%a%", "==": "b"}, "x": {"near": 1}}}));
        assert_eq!(compiled, json!({"name": "b"}));
    }

    #[test]
    fn test_empty_and_reserved_only() {
        assert_eq!(compile(json!({})), json!({}));
        assert_eq!(
            compile(json!({"orderBy": "a", "skip": 1, "offset": 2, "limit": 3, "sort": "b"})),
            json!({})
        );
    }

    #[test]
    fn test_query_is_not_mutated() {
        let query = SelectionQuery::from_value(json!({"name": "X", "where": {"age": {">": 1}}})).unwrap();
        let before = query.clone();
        let _ = compile_filter(&query);
        assert_eq!(query, before);
    }
}
