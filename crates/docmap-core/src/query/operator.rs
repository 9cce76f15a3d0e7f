//! Operator table: abstract operator tokens to native constructs.

/// Prefix marking an operator as a member of the shared OR-group.
pub const OR_PREFIX: char = '|';

/// A comparison operator understood by the predicate compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality; compiles to a bare value.
    Eq,
    /// Inequality (`$ne`).
    Ne,
    /// Greater than (`$gt`).
    Gt,
    /// Greater than or equal (`$gte`).
    Gte,
    /// Less than (`$lt`).
    Lt,
    /// Less than or equal (`$lte`).
    Lte,
    /// Membership (`$in`).
    In,
    /// Non-membership (`$nin`).
    NotIn,
}

/// Every plain token and the operator it denotes.
const OPERATOR_TABLE: [(&str, Operator); 12] = [
    ("==", Operator::Eq),
    ("===", Operator::Eq),
    ("contains", Operator::Eq),
    ("!=", Operator::Ne),
    ("!==", Operator::Ne),
    ("notContains", Operator::Ne),
    (">", Operator::Gt),
    (">=", Operator::Gte),
    ("<", Operator::Lt),
    ("<=", Operator::Lte),
    ("in", Operator::In),
    ("notIn", Operator::NotIn),
];

/// A parsed operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedOperator {
    /// The operator.
    pub operator: Operator,
    /// Whether the criterion joins the OR-group.
    pub or_group: bool,
}

impl Operator {
    /// Look up a plain (un-prefixed) token.
    pub fn lookup(token: &str) -> Option<Operator> {
        OPERATOR_TABLE
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, op)| *op)
    }

    /// Parse a token, recognizing the OR prefix.
    pub fn parse(token: &str) -> Option<ParsedOperator> {
        match token.strip_prefix(OR_PREFIX) {
            Some(plain) => Self::lookup(plain).map(|operator| ParsedOperator {
                operator,
                or_group: true,
            }),
            None => Self::lookup(token).map(|operator| ParsedOperator {
                operator,
                or_group: false,
            }),
        }
    }

    /// Native operator key, or `None` for equality (a bare value).
    pub fn native_key(self) -> Option<&'static str> {
        match self {
            Operator::Eq => None,
            Operator::Ne => Some("$ne"),
            Operator::Gt => Some("$gt"),
            Operator::Gte => Some("$gte"),
            Operator::Lt => Some("$lt"),
            Operator::Lte => Some("$lte"),
            Operator::In => Some("$in"),
            Operator::NotIn => Some("$nin"),
        }
    }

    /// All plain tokens, in table order.
    pub fn tokens() -> impl Iterator<Item = &'static str> {
        OPERATOR_TABLE.iter().map(|(t, _)| *t)
    }
}
