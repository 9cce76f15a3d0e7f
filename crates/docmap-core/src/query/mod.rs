//! Query compilation.
//!
//! Selection queries are compiled into the two independent native documents
//! a document store consumes: a filter and an options document.

mod filter;
mod operator;
mod options;

pub use filter::{compile_filter, OR_KEY};
pub use operator::{Operator, ParsedOperator, OR_PREFIX};
pub use options::compile_options;

use docmap_proto::{NativeQuery, SelectionQuery};

/// Compile both native documents for a selection query.
pub fn compile(query: &SelectionQuery) -> NativeQuery {
    NativeQuery {
        filter: compile_filter(query),
        options: compile_options(query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_compile_both_documents() {
        let query = SelectionQuery::new()
            .with_where("age", ">", 18)
            .with_filter("status", "active")
            .with_order_by("name")
            .with_skip(5)
            .with_limit(10);

        let native = compile(&query);

        assert_eq!(
            serde_json::to_value(&native).unwrap(),
            json!({
                "filter": {"age": {"$gt": 18}, "status": "active"},
                "options": {"sort": [["name", "asc"]], "skip": 5, "limit": 10}
            })
        );
    }
}
