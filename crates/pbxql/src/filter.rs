//! SQL predicate compiler.
//!
//! A [`Filter`] walks a parsed expression list, resolves every column
//! reference against the entity's fields, checks that the operator is legal
//! for the field's database type and emits a SQL boolean expression.
//!
//! # Emitted SQL per type
//!
//! | Type | Operators | Example |
//! |------|-----------|---------|
//! | Boolean | `=`, `!=` | `"active" = TRUE` |
//! | Integer, Decimal | `=`, `!=`, `>`, `>=`, `<`, `<=` | `"age" > 18` |
//! | Date, Time, Timestamp | `=`, `!=`, `>`, `>=`, `<`, `<=` | `"born" < '2000-01-01'` |
//! | Varchar, Text, Char, Uuid | `=`, `!=`, `LIKE` | `lower("name") like lower('%x%')` |
//!
//! `ISNULL` and `ISNOTNULL` are legal for every type. Text and date-like
//! columns treat the empty string as null; UUID, boolean and numeric
//! columns check for SQL `NULL` only.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::expr::{strip_quote_chars, unquote, ExpressionNode};
use crate::field::{DbType, FieldDescriptor, FieldResolver};
use crate::op::Op;
use crate::parser::Parser;
use crate::quote::Quoter;
use crate::tokenizer::Tokenizer;

// ASCII digits only: `\d` would accept any Unicode digit.
static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("numeric pattern is valid")
});

/// Compiles PbxQL queries into SQL predicates for one entity.
///
/// The filter borrows its collaborators: a [`FieldResolver`] describing the
/// entity's columns and a [`Quoter`] for identifiers and literals. It holds
/// no mutable state, so one filter can serve any number of queries.
///
/// # Example
///
/// ```
/// use pbxql::{DbType, Dialect, FieldDescriptor, Filter};
///
/// let fields = vec![
///     FieldDescriptor::new("name", DbType::Varchar).searchable(true),
///     FieldDescriptor::new("age", DbType::Integer),
/// ];
///
/// let filter = Filter::new(&fields, &Dialect::Ansi);
/// let sql = filter.compile_query("age > 18 and name like \"%ann%\"").unwrap();
/// assert_eq!(sql, r#""age" > 18 AND lower("name") like lower('%ann%')"#);
/// ```
pub struct Filter<'a, F: ?Sized, Q: ?Sized> {
    fields: &'a F,
    quoter: &'a Q,
    prefix: Option<String>,
    parser: Parser,
}

impl<'a, F, Q> Filter<'a, F, Q>
where
    F: FieldResolver + ?Sized,
    Q: Quoter + ?Sized,
{
    /// Creates a filter without a table prefix, using strict tokenizing.
    pub fn new(fields: &'a F, quoter: &'a Q) -> Self {
        Filter {
            fields,
            quoter,
            prefix: None,
            parser: Parser::new(),
        }
    }

    /// Qualifies every column as `prefix.column`. An empty prefix is ignored.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.trim().is_empty()).then_some(prefix);
        self
    }

    /// Lets unterminated quotes and groups run to the end of the query.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.parser = Parser::with_tokenizer(Tokenizer::new().lenient(lenient));
        self
    }

    /// Returns the table prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Parses and compiles a query.
    ///
    /// An empty or whitespace-only query compiles to an empty string.
    pub fn compile_query(&self, query: &str) -> Result<String> {
        let nodes = self.parser.parse_query(query)?;
        let sql = self.compile(&nodes)?;
        debug!(query, sql = %sql, prefix = ?self.prefix, "compiled filter");
        Ok(sql)
    }

    /// Compiles a parsed expression list.
    pub fn compile(&self, nodes: &[ExpressionNode]) -> Result<String> {
        let mut sql = Fragments::default();
        let mut state = State::ExpectColumn { bind: None };

        for node in nodes {
            state = match (state, node) {
                (State::ExpectColumn { bind }, ExpressionNode::ColumnRef { name }) => {
                    State::ExpectOperator {
                        bind,
                        key: name.as_str(),
                    }
                }
                (State::ExpectColumn { bind }, ExpressionNode::SubExpression { children }) => {
                    let inner = self.compile(children)?;
                    if inner.is_empty() {
                        sql.push(bind, inner);
                    } else {
                        sql.push(bind, format!("({inner})"));
                    }
                    State::ExpectBindOrEnd
                }
                (State::ExpectOperator { bind, key }, ExpressionNode::Operator { op })
                    if op.is_null_check() =>
                {
                    sql.push(bind, self.predicate(key, op.as_str(), None)?);
                    State::ExpectBindOrEnd
                }
                (State::ExpectOperator { bind, key }, ExpressionNode::Operator { op })
                    if op.is_comparison() =>
                {
                    State::ExpectValue { bind, key, op: *op }
                }
                (State::ExpectValue { bind, key, op }, ExpressionNode::Value { raw }) => {
                    sql.push(bind, self.predicate(key, op.as_str(), Some(raw.as_str()))?);
                    State::ExpectBindOrEnd
                }
                (State::ExpectBindOrEnd, ExpressionNode::Operator { op }) if op.is_bind() => {
                    State::ExpectColumn { bind: Some(*op) }
                }
                (state, node) => {
                    return Err(QueryError::UnexpectedNode {
                        found: node.describe(),
                        expected: state.describe(),
                    })
                }
            };
        }

        match state {
            State::ExpectBindOrEnd | State::ExpectColumn { bind: None } => Ok(sql.finish()),
            state => Err(QueryError::IncompleteExpression {
                expected: state.describe(),
            }),
        }
    }

    /// Emits the SQL for a single `key op [value]` predicate.
    ///
    /// Quote characters are stripped from `key`, the surrounding quotes from
    /// `value`, and `op` is matched case-insensitively. A `key` of `*`
    /// expands to every searchable field, OR-joined and parenthesized; with
    /// no searchable fields the result is empty.
    pub fn predicate(&self, key: &str, op: &str, value: Option<&str>) -> Result<String> {
        let key = strip_quote_chars(key);
        let key = key.trim();
        let op_text = op.trim().to_ascii_uppercase();
        let op = Op::parse(&op_text)
            .filter(|op| op.is_comparison())
            .ok_or(QueryError::UnknownOperator(op_text))?;
        let value = value.map(unquote).unwrap_or("");

        if key == "*" {
            return self.wildcard(op, value);
        }

        let field = self
            .fields
            .resolve(key)
            .ok_or_else(|| QueryError::UnknownField(key.to_string()))?;
        self.field_predicate(field, op, value)
    }

    fn wildcard(&self, op: Op, value: &str) -> Result<String> {
        let parts = self
            .fields
            .searchable_fields()
            .into_iter()
            .map(|field| self.field_predicate(field, op, value))
            .collect::<Result<Vec<_>>>()?;

        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("({})", parts.join(" OR ")))
    }

    fn field_predicate(&self, field: &FieldDescriptor, op: Op, value: &str) -> Result<String> {
        let column = self.column(field);
        let db_type = field.db_type;

        let sql = match db_type {
            DbType::Boolean => {
                ensure(field, op, Op::is_boolean_op)?;
                match op {
                    Op::IsNull => format!("{column} IS NULL"),
                    Op::IsNotNull => format!("{column} IS NOT NULL"),
                    _ => format!("{column} {op} {}", boolean_literal(value)),
                }
            }

            _ if db_type.is_numeric() => {
                ensure(field, op, Op::is_number_op)?;
                match op {
                    Op::IsNull => format!("{column} IS NULL"),
                    Op::IsNotNull => format!("{column} IS NOT NULL"),
                    _ => format!("{column} {op} {}", numeric_literal(value)),
                }
            }

            _ if db_type.is_temporal() => {
                ensure(field, op, Op::is_temporal_op)?;
                match op {
                    Op::IsNull | Op::IsNotNull => empty_or_null(&column, op),
                    _ => format!("{column} {op} {}", self.quoter.quote_value(value)),
                }
            }

            // varchar, text, char and uuid
            _ => {
                ensure(field, op, Op::is_text_op)?;
                match op {
                    Op::IsNull if db_type == DbType::Uuid => format!("{column} is null"),
                    Op::IsNotNull if db_type == DbType::Uuid => {
                        format!("{column} is not null")
                    }
                    Op::IsNull | Op::IsNotNull => empty_or_null(&column, op),
                    Op::Like => format!(
                        "lower({column}) like lower({})",
                        self.quoter.quote_value(value)
                    ),
                    _ => format!("{column} {op} {}", self.quoter.quote_value(value)),
                }
            }
        };

        Ok(sql)
    }

    fn column(&self, field: &FieldDescriptor) -> String {
        let ident = self.quoter.quote_identifier(&field.id);
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{ident}"),
            None => ident,
        }
    }
}

/// Compiles `query` against `fields` in one call.
///
/// `prefix` qualifies every column; pass `""` for none.
pub fn compile<F, Q>(fields: &F, quoter: &Q, query: &str, prefix: &str) -> Result<String>
where
    F: FieldResolver + ?Sized,
    Q: Quoter + ?Sized,
{
    Filter::new(fields, quoter)
        .with_prefix(prefix)
        .compile_query(query)
}

// ============================================================================
// Compiler state
// ============================================================================

/// What the compiler expects next, with the parts of the current term read
/// so far.
#[derive(Debug, Clone, Copy)]
enum State<'n> {
    ExpectColumn { bind: Option<Op> },
    ExpectOperator { bind: Option<Op>, key: &'n str },
    ExpectValue { bind: Option<Op>, key: &'n str, op: Op },
    ExpectBindOrEnd,
}

impl State<'_> {
    fn describe(&self) -> &'static str {
        match self {
            State::ExpectColumn { .. } => "column reference or sub-expression",
            State::ExpectOperator { .. } => "comparison operator",
            State::ExpectValue { .. } => "value",
            State::ExpectBindOrEnd => "AND, OR or end of expression",
        }
    }
}

/// Always-false predicate standing in for an empty term.
const NO_MATCH: &str = "(1=0)";

/// Emitted predicates with the bind operator that precedes each.
#[derive(Debug, Default)]
struct Fragments {
    parts: Vec<(Option<Op>, String)>,
}

impl Fragments {
    fn push(&mut self, bind: Option<Op>, sql: String) {
        self.parts.push((bind, sql));
    }

    /// Joins the fragments. An empty fragment matches nothing, so next to
    /// other terms it becomes [`NO_MATCH`]; if every fragment is empty the
    /// result is empty.
    fn finish(self) -> String {
        if self.parts.iter().all(|(_, sql)| sql.is_empty()) {
            return String::new();
        }
        let mut out = String::new();
        for (i, (bind, sql)) in self.parts.into_iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(bind.unwrap_or(Op::And).as_str());
                out.push(' ');
            }
            if sql.is_empty() {
                out.push_str(NO_MATCH);
            } else {
                out.push_str(&sql);
            }
        }
        out
    }
}

// ============================================================================
// Literal helpers
// ============================================================================

fn ensure(field: &FieldDescriptor, op: Op, allowed: fn(Op) -> bool) -> Result<()> {
    if allowed(op) {
        Ok(())
    } else {
        Err(QueryError::InvalidOperatorForType {
            op: op.as_str(),
            field: field.id.clone(),
            db_type: field.db_type,
        })
    }
}

fn boolean_literal(value: &str) -> &'static str {
    let value = value.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Numeric literals pass through; anything else becomes `0`.
fn numeric_literal(value: &str) -> &str {
    let value = value.trim();
    if NUMERIC.is_match(value) {
        value
    } else {
        "0"
    }
}

fn empty_or_null(column: &str, op: Op) -> String {
    match op {
        Op::IsNotNull => format!("({column} is not null and {column}!= '')"),
        _ => format!("({column} is null or {column}= '')"),
    }
}
