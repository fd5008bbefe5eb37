//! Expression tree produced by the parser.

use serde::Serialize;

use crate::op::Op;
use crate::tokenizer::QUOTES;

/// One node of a parsed query.
///
/// A well-formed sequence reads
/// `ColumnRef Operator [Value] (Operator ColumnRef Operator [Value])*`,
/// where any `ColumnRef Operator [Value]` term may be replaced by a
/// `SubExpression`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionNode {
    /// A field identifier or the `*` wildcard, as written.
    ColumnRef { name: String },
    /// A bind or comparison operator.
    Operator { op: Op },
    /// A literal, as written (quotes included).
    Value { raw: String },
    /// The parsed contents of a parenthesized group.
    SubExpression { children: Vec<ExpressionNode> },
}

impl ExpressionNode {
    pub fn column(name: impl Into<String>) -> Self {
        ExpressionNode::ColumnRef { name: name.into() }
    }

    pub fn operator(op: Op) -> Self {
        ExpressionNode::Operator { op }
    }

    pub fn value(raw: impl Into<String>) -> Self {
        ExpressionNode::Value { raw: raw.into() }
    }

    pub fn group(children: Vec<ExpressionNode>) -> Self {
        ExpressionNode::SubExpression { children }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ExpressionNode::ColumnRef { name } => format!("column reference '{name}'"),
            ExpressionNode::Operator { op } => format!("operator '{op}'"),
            ExpressionNode::Value { raw } => format!("value '{raw}'"),
            ExpressionNode::SubExpression { .. } => "sub-expression".to_string(),
        }
    }
}

/// Removes every quote character from an identifier.
pub fn strip_quote_chars(text: &str) -> String {
    text.chars().filter(|c| !QUOTES.contains(c)).collect()
}

/// Removes one pair of matching quotes surrounding a literal, if present.
///
/// A literal left open by lenient tokenizing loses only its opening quote.
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    let Some(first) = text.chars().next() else {
        return text;
    };
    if !QUOTES.contains(&first) {
        return text;
    }
    let inner = &text[first.len_utf8()..];
    inner.strip_suffix(first).unwrap_or(inner)
}
