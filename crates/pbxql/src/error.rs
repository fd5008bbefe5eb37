//! Error types for the pbxql crate.
//!
//! [`QueryError`] covers everything that can go wrong turning a query into
//! SQL. [`ConfigError`] covers loading field metadata from disk.

use std::path::PathBuf;

use thiserror::Error;

use crate::field::DbType;

/// Errors raised while tokenizing, parsing or compiling a query.
///
/// Every variant aborts compilation; no partial SQL is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A quote was opened but never closed.
    #[error("query parsing error: unterminated {quote} quote starting at offset {offset}")]
    UnterminatedQuote { quote: char, offset: usize },

    /// A parenthesis has no matching partner.
    #[error("query parsing error: unbalanced parenthesis at offset {offset}")]
    UnbalancedParenthesis { offset: usize },

    /// A token appeared where the grammar does not allow it.
    #[error("query parsing error: expected {expected}, found '{found}' at offset {offset}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    /// An expression node appeared where the grammar does not allow it.
    #[error("query parsing error: expected {expected}, found {found}")]
    UnexpectedNode {
        found: String,
        expected: &'static str,
    },

    /// The query ended in the middle of a predicate.
    #[error("query parsing error: incomplete expression, expected {expected}")]
    IncompleteExpression { expected: &'static str },

    /// Operator is not part of the language.
    #[error("query parsing error: unknown operator '{0}'")]
    UnknownOperator(String),

    /// Column reference does not resolve to a known field.
    #[error("query parsing error: unknown field '{0}'")]
    UnknownField(String),

    /// Operator is not valid for the field's database type.
    #[error("query parsing error: operator '{op}' is not valid for field '{field}' of type {db_type}")]
    InvalidOperatorForType {
        op: &'static str,
        field: String,
        db_type: DbType,
    },

    /// Database type name is not recognised.
    #[error("query parsing error: unknown database type '{0}'")]
    UnknownDbType(String),
}

/// Result type for pbxql operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised while loading a schema file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read schema file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML document is malformed or does not match the schema layout.
    #[error("invalid YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document is malformed or does not match the schema layout.
    #[error("invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is neither YAML nor JSON.
    #[error("unsupported schema file format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Two fields share the same id.
    #[error("duplicate field id '{0}' in schema")]
    DuplicateField(String),
}
