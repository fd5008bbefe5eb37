//! Field metadata consumed by the compiler.
//!
//! The compiler never owns an entity model. It asks a [`FieldResolver`] for
//! the descriptor of each column reference, and for the list of searchable
//! fields when expanding the `*` wildcard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Coarse value kind of a column, driving operator legality and quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DbType {
    Boolean,
    Char,
    Date,
    Decimal,
    Integer,
    Text,
    Time,
    Timestamp,
    Uuid,
    Varchar,
}

impl DbType {
    /// Returns the lowercase name used in schema files.
    pub fn as_str(self) -> &'static str {
        match self {
            DbType::Boolean => "boolean",
            DbType::Char => "char",
            DbType::Date => "date",
            DbType::Decimal => "decimal",
            DbType::Integer => "integer",
            DbType::Text => "text",
            DbType::Time => "time",
            DbType::Timestamp => "timestamp",
            DbType::Uuid => "uuid",
            DbType::Varchar => "varchar",
        }
    }

    /// Returns `true` for integer and decimal columns.
    pub fn is_numeric(self) -> bool {
        matches!(self, DbType::Integer | DbType::Decimal)
    }

    /// Returns `true` for date, time and timestamp columns.
    pub fn is_temporal(self) -> bool {
        matches!(self, DbType::Date | DbType::Time | DbType::Timestamp)
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => DbType::Boolean,
            "char" => DbType::Char,
            "date" => DbType::Date,
            "decimal" | "numeric" => DbType::Decimal,
            "integer" | "int" => DbType::Integer,
            "text" => DbType::Text,
            "time" => DbType::Time,
            "timestamp" | "datetime" => DbType::Timestamp,
            "uuid" => DbType::Uuid,
            "varchar" | "string" => DbType::Varchar,
            _ => return Err(QueryError::UnknownDbType(s.to_string())),
        };
        Ok(ty)
    }
}

impl TryFrom<String> for DbType {
    type Error = QueryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DbType> for String {
    fn from(ty: DbType) -> Self {
        ty.as_str().to_string()
    }
}

/// Read-only description of one queryable column.
///
/// # Example
///
/// ```
/// use pbxql::{DbType, FieldDescriptor};
///
/// let name = FieldDescriptor::new("name", DbType::Varchar).searchable(true);
/// assert!(name.is_searchable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column identifier, as written in queries and in SQL.
    pub id: String,
    /// Database type of the column.
    #[serde(rename = "type")]
    pub db_type: DbType,
    /// Whether `*` expands to this field.
    #[serde(default, rename = "searchable")]
    pub is_searchable: bool,
}

impl FieldDescriptor {
    /// Creates a non-searchable field.
    pub fn new(id: impl Into<String>, db_type: DbType) -> Self {
        FieldDescriptor {
            id: id.into(),
            db_type,
            is_searchable: false,
        }
    }

    /// Sets the searchable flag.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.is_searchable = searchable;
        self
    }
}

/// Lookup capability over an entity's fields.
pub trait FieldResolver {
    /// Returns the descriptor for `id`, if the entity has such a field.
    fn resolve(&self, id: &str) -> Option<&FieldDescriptor>;

    /// Returns all searchable fields, in declaration order.
    fn searchable_fields(&self) -> Vec<&FieldDescriptor>;
}

impl FieldResolver for [FieldDescriptor] {
    fn resolve(&self, id: &str) -> Option<&FieldDescriptor> {
        self.iter().find(|field| field.id == id)
    }

    fn searchable_fields(&self) -> Vec<&FieldDescriptor> {
        self.iter().filter(|field| field.is_searchable).collect()
    }
}

impl FieldResolver for Vec<FieldDescriptor> {
    fn resolve(&self, id: &str) -> Option<&FieldDescriptor> {
        self.as_slice().resolve(id)
    }

    fn searchable_fields(&self) -> Vec<&FieldDescriptor> {
        self.as_slice().searchable_fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("name", DbType::Varchar).searchable(true),
            FieldDescriptor::new("id", DbType::Integer),
            FieldDescriptor::new("notes", DbType::Text).searchable(true),
        ]
    }

    #[test]
    fn resolve_by_id() {
        let fields = fields();
        assert_eq!(fields.resolve("id").map(|f| f.db_type), Some(DbType::Integer));
        assert!(fields.resolve("missing").is_none());
        // exact match only
        assert!(fields.resolve("Name").is_none());
    }

    #[test]
    fn searchable_fields_keep_order() {
        let fields = fields();
        let ids: Vec<&str> = fields
            .searchable_fields()
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["name", "notes"]);
    }

    #[test]
    fn db_type_from_str() {
        assert_eq!("VARCHAR".parse::<DbType>().unwrap(), DbType::Varchar);
        assert_eq!("uuid".parse::<DbType>().unwrap(), DbType::Uuid);
        assert_eq!("datetime".parse::<DbType>().unwrap(), DbType::Timestamp);
        assert_eq!(
            "blob".parse::<DbType>(),
            Err(QueryError::UnknownDbType("blob".to_string()))
        );
    }

    #[test]
    fn db_type_groups() {
        assert!(DbType::Decimal.is_numeric());
        assert!(DbType::Time.is_temporal());
        assert!(!DbType::Uuid.is_temporal());
        assert!(!DbType::Boolean.is_numeric());
    }
}
