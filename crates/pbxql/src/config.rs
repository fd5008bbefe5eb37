//! Schema files.
//!
//! A schema file lists an entity's fields together with the compiler
//! settings used for it. YAML and JSON are accepted, chosen by extension:
//!
//! ```yaml
//! dialect: ansi          # ansi | mysql
//! prefix: t              # optional table prefix
//! lenient: false         # let open quotes and groups run to the end
//! cache_capacity: 256    # FilterCache bound, 0 disables caching
//! fields:
//!   - { id: name, type: varchar, searchable: true }
//!   - { id: age,  type: integer }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field::FieldDescriptor;
use crate::filter::Filter;
use crate::quote::Dialect;

/// Default bound on cached predicates per [`FilterCache`](crate::FilterCache).
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Field metadata plus compiler settings, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub lenient: bool,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaFile {
    /// Creates a schema with default settings.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        SchemaFile {
            dialect: Dialect::default(),
            prefix: None,
            lenient: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            fields,
        }
    }

    /// Parses and validates a YAML schema.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let schema: SchemaFile = serde_yaml::from_str(text)?;
        schema.validate()
    }

    /// Parses and validates a JSON schema.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let schema: SchemaFile = serde_json::from_str(text)?;
        schema.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(ConfigError::DuplicateField(field.id.clone()));
            }
        }
        Ok(self)
    }

    /// Builds a [`Filter`] configured from this schema.
    pub fn filter(&self) -> Filter<'_, Vec<FieldDescriptor>, Dialect> {
        Filter::new(&self.fields, &self.dialect)
            .with_prefix(self.prefix.clone().unwrap_or_default())
            .lenient(self.lenient)
    }
}

/// Loads a schema file, picking the format from the extension.
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<SchemaFile, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let read = || {
        fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    match extension.as_deref() {
        Some("yaml" | "yml") => SchemaFile::from_yaml_str(&read()?),
        Some("json") => SchemaFile::from_json_str(&read()?),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DbType;

    const YAML: &str = r#"
dialect: mysql
prefix: t
fields:
  - { id: name, type: varchar, searchable: true }
  - { id: age, type: INTEGER }
"#;

    #[test]
    fn yaml_with_defaults() {
        let schema = SchemaFile::from_yaml_str(YAML).unwrap();
        assert_eq!(schema.dialect, Dialect::MySql);
        assert_eq!(schema.prefix.as_deref(), Some("t"));
        assert!(!schema.lenient);
        assert_eq!(schema.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(
            schema.fields,
            vec![
                FieldDescriptor::new("name", DbType::Varchar).searchable(true),
                FieldDescriptor::new("age", DbType::Integer),
            ]
        );
    }

    #[test]
    fn json_schema() {
        let schema = SchemaFile::from_json_str(
            r#"{"lenient": true, "fields": [{"id": "ok", "type": "boolean"}]}"#,
        )
        .unwrap();
        assert!(schema.lenient);
        assert_eq!(schema.dialect, Dialect::Ansi);
        assert_eq!(schema.fields[0].db_type, DbType::Boolean);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = SchemaFile::from_yaml_str("fields: [{ id: a, type: blob }]").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("blob"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(SchemaFile::from_yaml_str("dialekt: ansi\nfields: []").is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = SchemaFile::from_yaml_str(
            "fields: [{ id: a, type: text }, { id: a, type: integer }]",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField(id) if id == "a"));
    }

    #[test]
    fn filter_uses_schema_settings() {
        let schema = SchemaFile::from_yaml_str(YAML).unwrap();
        assert_eq!(
            schema.filter().compile_query("age > 3").unwrap(),
            "t.`age` > 3"
        );
    }

    #[test]
    fn unsupported_extension() {
        assert!(matches!(
            load_schema_file("fields.toml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            load_schema_file("/definitely/not/here.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
