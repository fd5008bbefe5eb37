//! Identifier and value quoting.
//!
//! The compiler does not know which database it targets. Column names go
//! through an [`IdentifierQuoter`] and string literals through a
//! [`ValueQuoter`]; [`Dialect`] provides both for the common backends.

use serde::{Deserialize, Serialize};

/// Quotes SQL identifiers (column and table names).
pub trait IdentifierQuoter {
    fn quote_identifier(&self, ident: &str) -> String;
}

/// Quotes SQL string literals.
pub trait ValueQuoter {
    fn quote_value(&self, value: &str) -> String;
}

/// Both quoting capabilities at once.
///
/// Implemented automatically for every type that implements the two halves.
pub trait Quoter: IdentifierQuoter + ValueQuoter {}

impl<T: IdentifierQuoter + ValueQuoter + ?Sized> Quoter for T {}

/// Built-in quoting rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Standard SQL: `"ident"`, `'value'`. PostgreSQL and SQLite.
    #[default]
    #[serde(alias = "postgres", alias = "postgresql", alias = "sqlite")]
    Ansi,
    /// MySQL and MariaDB: `` `ident` ``, `'value'` with backslashes escaped.
    #[serde(alias = "mariadb")]
    MySql,
}

impl Dialect {
    /// Returns the name used in schema files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Ansi => "ansi",
            Dialect::MySql => "mysql",
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansi" | "postgres" | "postgresql" | "sqlite" => Ok(Dialect::Ansi),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            other => Err(format!("unknown dialect '{other}'")),
        }
    }
}

impl IdentifierQuoter for Dialect {
    fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::Ansi => wrap(ident, '"', "\"\""),
            Dialect::MySql => wrap(ident, '`', "``"),
        }
    }
}

impl ValueQuoter for Dialect {
    fn quote_value(&self, value: &str) -> String {
        match self {
            Dialect::Ansi => wrap(value, '\'', "''"),
            Dialect::MySql => wrap(&value.replace('\\', "\\\\"), '\'', "''"),
        }
    }
}

fn wrap(text: &str, quote: char, escaped: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        if c == quote {
            out.push_str(escaped);
        } else {
            out.push(c);
        }
    }
    out.push(quote);
    out
}
