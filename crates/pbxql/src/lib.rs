//! PbxQL - a small filter language compiled to SQL predicates.
//!
//! PbxQL queries read like `name = "foo" and (age > 18 or "active" isnotnull)`.
//! This crate turns them into a SQL boolean expression for one entity,
//! checking every operator against the database type of the field it is
//! applied to:
//!
//! - Tokenizing with quote- and parenthesis-aware merging
//! - Parsing into an expression tree with nested groups
//! - Compiling to SQL with per-type operator rules and value quoting
//! - A `*` wildcard that searches every searchable field
//! - Pluggable identifier and value quoting for different databases
//!
//! # Quick Start
//!
//! ```rust
//! use pbxql::{compile, DbType, Dialect, FieldDescriptor};
//!
//! let fields = vec![
//!     FieldDescriptor::new("name", DbType::Varchar).searchable(true),
//!     FieldDescriptor::new("email", DbType::Varchar).searchable(true),
//!     FieldDescriptor::new("age", DbType::Integer),
//!     FieldDescriptor::new("active", DbType::Boolean),
//! ];
//!
//! let sql = compile(
//!     &fields,
//!     &Dialect::Ansi,
//!     r#"active = true and (age >= 18 or * like "%admin%")"#,
//!     "u",
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r#"u."active" = TRUE AND (u."age" >= 18 OR (lower(u."name") like lower('%admin%') OR lower(u."email") like lower('%admin%')))"#
//! );
//! ```
//!
//! # Grammar
//!
//! ```text
//! query      := exprList
//! exprList   := term (bindOp term)*
//! term       := colRef cmpOp (value)?  |  '(' exprList ')'
//! bindOp     := 'AND' | 'OR' | '&&' | '||'
//! cmpOp      := '=' | '!=' | '>=' | '>' | '<=' | '<' | 'LIKE' | 'ISNULL' | 'ISNOTNULL'
//! colRef     := identifier | '*'
//! value      := quoted-string | bare-token
//! ```
//!
//! Keywords are case-insensitive. Identifiers and values may be quoted with
//! `'`, `"`, `` ` `` or `´`.
//!
//! # Pipeline
//!
//! | Stage | Entry point | Output |
//! |-------|-------------|--------|
//! | Tokenize | [`Tokenizer::tokenize`] | [`Token`]s |
//! | Parse | [`Parser::parse`] | [`ExpressionNode`]s |
//! | Compile | [`Filter::compile`] | SQL string |

mod cache;
mod config;
mod error;
mod expr;
mod field;
mod filter;
mod op;
mod parser;
mod quote;
mod tokenizer;

// Re-export public API
pub use cache::FilterCache;
pub use config::{load_schema_file, SchemaFile, DEFAULT_CACHE_CAPACITY};
pub use error::{ConfigError, QueryError, Result};
pub use expr::{strip_quote_chars, unquote, ExpressionNode};
pub use field::{DbType, FieldDescriptor, FieldResolver};
pub use filter::{compile, Filter};
pub use op::Op;
pub use parser::{parse, Parser};
pub use quote::{Dialect, IdentifierQuoter, Quoter, ValueQuoter};
pub use tokenizer::{tokenize, Token, TokenKind, Tokenizer, QUOTES};
