//! Operators of the filter language.
//!
//! The [`Op`] enum covers both bind operators (`AND`, `OR`) and comparison
//! operators. Which comparison operators are legal depends on the database
//! type of the field on the left-hand side.

use serde::{Serialize, Serializer};

/// An operator token.
///
/// Operators are grouped by the types they support:
/// - **Bind**: `And`, `Or` - join two terms
/// - **Null checks**: `IsNull`, `IsNotNull` - valid for every type, take no value
/// - **Equality**: `Eq`, `Ne` - valid for every type
/// - **Ordering**: `Gt`, `Gte`, `Lt`, `Lte` - numbers and dates
/// - **Pattern**: `Like` - text columns only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Bind operators
    /// Both sides must hold.
    And,
    /// Either side must hold.
    Or,

    // Null checks
    /// Column has no value.
    IsNull,
    /// Column has a value.
    IsNotNull,

    // Comparison operators
    /// Case-insensitive pattern match.
    Like,
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl Op {
    /// Recognises an operator keyword or symbol, ignoring ASCII case and
    /// surrounding whitespace.
    ///
    /// `&&` and `||` are accepted as spellings of `AND` and `OR`.
    pub fn parse(token: &str) -> Option<Op> {
        let token = token.trim();
        let op = match token {
            "=" => Op::Eq,
            "!=" => Op::Ne,
            ">=" => Op::Gte,
            ">" => Op::Gt,
            "<=" => Op::Lte,
            "<" => Op::Lt,
            "&&" => Op::And,
            "||" => Op::Or,
            _ if token.eq_ignore_ascii_case("and") => Op::And,
            _ if token.eq_ignore_ascii_case("or") => Op::Or,
            _ if token.eq_ignore_ascii_case("like") => Op::Like,
            _ if token.eq_ignore_ascii_case("isnull") => Op::IsNull,
            _ if token.eq_ignore_ascii_case("isnotnull") => Op::IsNotNull,
            _ => return None,
        };
        Some(op)
    }

    /// Returns `true` for `AND` and `OR`.
    pub fn is_bind(self) -> bool {
        matches!(self, Op::And | Op::Or)
    }

    /// Returns `true` for every operator that may follow a column reference.
    pub fn is_comparison(self) -> bool {
        !self.is_bind()
    }

    /// Returns `true` for `ISNULL` and `ISNOTNULL`, which take no value.
    pub fn is_null_check(self) -> bool {
        matches!(self, Op::IsNull | Op::IsNotNull)
    }

    /// Returns `true` if this operator is valid for boolean columns.
    pub fn is_boolean_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne) || self.is_null_check()
    }

    /// Returns `true` if this operator is valid for numeric columns.
    pub fn is_number_op(self) -> bool {
        matches!(
            self,
            Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte | Op::IsNull | Op::IsNotNull
        )
    }

    /// Returns `true` if this operator is valid for date and time columns.
    pub fn is_temporal_op(self) -> bool {
        self.is_number_op()
    }

    /// Returns `true` if this operator is valid for text and UUID columns.
    pub fn is_text_op(self) -> bool {
        matches!(self, Op::Like | Op::Eq | Op::Ne) || self.is_null_check()
    }

    /// Returns the canonical spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::And => "AND",
            Op::Or => "OR",
            Op::IsNull => "ISNULL",
            Op::IsNotNull => "ISNOTNULL",
            Op::Like => "LIKE",
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
