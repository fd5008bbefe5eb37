//! Memoized compilation.
//!
//! [`FilterCache`] owns an entity's fields and remembers the SQL compiled for
//! each `(query, prefix)` pair. Replacing the fields drops every entry.
//! Failed compilations are never cached.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::SchemaFile;
use crate::error::Result;
use crate::field::FieldDescriptor;
use crate::filter::Filter;
use crate::quote::Dialect;

/// Thread-safe cache of compiled predicates for one entity.
///
/// # Example
///
/// ```
/// use pbxql::{DbType, Dialect, FieldDescriptor, FilterCache};
///
/// let cache = FilterCache::new(vec![FieldDescriptor::new("age", DbType::Integer)], Dialect::Ansi);
/// let first = cache.compile("age > 1", "").unwrap();
/// let second = cache.compile("age > 1", "").unwrap();
/// assert_eq!(first, second);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct FilterCache {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    fields: Vec<FieldDescriptor>,
    dialect: Dialect,
    lenient: bool,
    capacity: usize,
    generation: u64,
    entries: HashMap<(String, String), String>,
}

impl FilterCache {
    /// Creates a strict cache with the default capacity.
    pub fn new(fields: Vec<FieldDescriptor>, dialect: Dialect) -> Self {
        FilterCache::with_settings(fields, dialect, false, crate::config::DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache from a schema file's fields and settings.
    ///
    /// The schema's table prefix is not applied; pass it to [`compile`](Self::compile).
    pub fn from_schema(schema: &SchemaFile) -> Self {
        FilterCache::with_settings(
            schema.fields.clone(),
            schema.dialect,
            schema.lenient,
            schema.cache_capacity,
        )
    }

    fn with_settings(
        fields: Vec<FieldDescriptor>,
        dialect: Dialect,
        lenient: bool,
        capacity: usize,
    ) -> Self {
        FilterCache {
            inner: RwLock::new(Inner {
                fields,
                dialect,
                lenient,
                capacity,
                generation: 0,
                entries: HashMap::new(),
            }),
        }
    }

    /// Compiles `query`, or returns the SQL cached for `(query, prefix)`.
    pub fn compile(&self, query: &str, prefix: &str) -> Result<String> {
        let key = (query.to_string(), prefix.to_string());

        let (sql, generation) = {
            let inner = self.inner.read();
            if let Some(sql) = inner.entries.get(&key) {
                trace!(query, prefix, "filter cache hit");
                return Ok(sql.clone());
            }
            let sql = Filter::new(&inner.fields, &inner.dialect)
                .with_prefix(prefix)
                .lenient(inner.lenient)
                .compile_query(query)?;
            (sql, inner.generation)
        };

        let mut inner = self.inner.write();
        // fields were replaced while compiling
        if inner.generation != generation || inner.capacity == 0 {
            return Ok(sql);
        }
        if inner.entries.len() >= inner.capacity {
            debug!(capacity = inner.capacity, "filter cache full, clearing");
            inner.entries.clear();
        }
        inner.entries.insert(key, sql.clone());
        Ok(sql)
    }

    /// Swaps in new field metadata and drops every cached predicate.
    pub fn replace_fields(&self, fields: Vec<FieldDescriptor>) {
        let mut inner = self.inner.write();
        inner.fields = fields;
        inner.generation += 1;
        inner.entries.clear();
        debug!(generation = inner.generation, "filter cache invalidated");
    }

    /// Returns a copy of the current field metadata.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        self.inner.read().fields.clone()
    }

    /// Drops every cached predicate, keeping the fields.
    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Returns the number of cached predicates.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
