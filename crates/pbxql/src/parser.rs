//! Expression parser.
//!
//! Turns a token sequence into a flat list of [`ExpressionNode`]s. Grouped
//! tokens are re-tokenized and parsed recursively into sub-expressions.
//!
//! The parser tracks which kind of token it expects next and rejects
//! anything else, so malformed input fails here with the offending token
//! and its offset rather than being mis-tagged.

use tracing::trace;

use crate::error::{QueryError, Result};
use crate::expr::ExpressionNode;
use crate::op::Op;
use crate::tokenizer::{Token, TokenKind, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Column,
    Comparison,
    Value,
    Bind,
}

impl Expect {
    fn describe(self) -> &'static str {
        match self {
            Expect::Column => "column reference or group",
            Expect::Comparison => "comparison operator",
            Expect::Value => "value",
            Expect::Bind => "AND or OR",
        }
    }
}

/// How a single token reads, before the state machine decides if it fits.
enum Class {
    Group,
    Op(Op),
    Word,
}

fn classify(token: &Token<'_>) -> Class {
    match token.kind {
        TokenKind::Group => Class::Group,
        TokenKind::Quoted => Class::Word,
        TokenKind::Text | TokenKind::Delimiter => match Op::parse(token.text) {
            Some(op) => Class::Op(op),
            None => Class::Word,
        },
    }
}

/// Parses queries into expression trees.
///
/// # Example
///
/// ```
/// use pbxql::{ExpressionNode, Op, Parser};
///
/// let nodes = Parser::new().parse_query("age > 18").unwrap();
/// assert_eq!(
///     nodes,
///     vec![
///         ExpressionNode::column("age"),
///         ExpressionNode::operator(Op::Gt),
///         ExpressionNode::value("18"),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    tokenizer: Tokenizer,
}

impl Parser {
    /// Creates a parser with a strict tokenizer.
    pub fn new() -> Self {
        Parser::default()
    }

    /// Uses `tokenizer` for the query and for every nested group.
    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Parser { tokenizer }
    }

    /// Tokenizes and parses a query.
    pub fn parse_query(&self, query: &str) -> Result<Vec<ExpressionNode>> {
        let tokens = self.tokenizer.tokenize(query)?;
        self.parse(&tokens)
    }

    /// Parses an already tokenized query.
    pub fn parse(&self, tokens: &[Token<'_>]) -> Result<Vec<ExpressionNode>> {
        let mut nodes = Vec::new();
        let mut expect = Expect::Column;

        for token in tokens.iter().filter(|token| !token.is_blank()) {
            let (node, next) = match (expect, classify(token)) {
                (Expect::Column, Class::Group) => (self.parse_group(token)?, Expect::Bind),
                (Expect::Column, Class::Word) => {
                    (ExpressionNode::column(token.text), Expect::Comparison)
                }
                (Expect::Comparison, Class::Op(op)) if op.is_comparison() => {
                    let next = if op.is_null_check() {
                        Expect::Bind
                    } else {
                        Expect::Value
                    };
                    (ExpressionNode::operator(op), next)
                }
                (Expect::Value, Class::Word) => (ExpressionNode::value(token.text), Expect::Bind),
                (Expect::Bind, Class::Op(op)) if op.is_bind() => {
                    (ExpressionNode::operator(op), Expect::Column)
                }
                (expect, _) => {
                    return Err(QueryError::UnexpectedToken {
                        found: token.text.to_string(),
                        expected: expect.describe(),
                        offset: token.offset,
                    })
                }
            };
            nodes.push(node);
            expect = next;
        }

        match expect {
            Expect::Bind => {}
            Expect::Column if nodes.is_empty() => {}
            Expect::Column => {
                return Err(QueryError::IncompleteExpression {
                    expected: "column reference or group after bind operator",
                })
            }
            other => {
                return Err(QueryError::IncompleteExpression {
                    expected: other.describe(),
                })
            }
        }

        trace!(count = nodes.len(), "parsed expression");
        Ok(nodes)
    }

    fn parse_group(&self, token: &Token<'_>) -> Result<ExpressionNode> {
        let inner = token.text.strip_prefix('(').unwrap_or(token.text);
        let inner = inner.strip_suffix(')').unwrap_or(inner);
        let tokens = self.tokenizer.tokenize_at(inner, token.offset + 1)?;
        Ok(ExpressionNode::group(self.parse(&tokens)?))
    }
}

/// Parses a query with the strict default settings.
pub fn parse(query: &str) -> Result<Vec<ExpressionNode>> {
    Parser::new().parse_query(query)
}
