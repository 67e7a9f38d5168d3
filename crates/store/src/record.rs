//! Binary records, record type metadata and field accessors
//!
//! A [`BinaryRecord`] is a named bag of string fields. Every record type gets
//! a stable numeric identity derived from its name, and the [`Binary`]
//! registry keeps the union of field names written for each type so a reader
//! can ask for "all fields" without holding a record of every shape.

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

/// Type identity for a record type name (case-insensitive)
pub fn type_id_of(type_name: &str) -> u64 {
    xxh3_64(type_name.to_lowercase().as_bytes())
}

/// A record stored in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryRecord {
    type_id: u64,
    type_name: String,
    fields: IndexMap<String, Option<String>>,
}

impl BinaryRecord {
    /// Start building a record of the given type
    pub fn builder(type_name: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(type_name)
    }

    pub fn type_id(&self) -> u64 {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Value of a field; `None` when the field is absent or null
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// Whether the record carries the field, even with a null value
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in write order, including null-valued fields
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builder seeded with this record's type and fields
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            type_name: self.type_name.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Non-null fields as a plain map
    pub fn to_fields(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
            .collect()
    }
}

/// Mutable builder for [`BinaryRecord`]
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    type_name: String,
    fields: IndexMap<String, Option<String>>,
}

impl RecordBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Set a field, replacing any previous value
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(name.into(), Some(value.into()));
        self
    }

    /// Declare a field with a null value
    pub fn set_null(&mut self, name: impl Into<String>) -> &mut Self {
        self.fields.insert(name.into(), None);
        self
    }

    pub fn build(self) -> BinaryRecord {
        BinaryRecord {
            type_id: type_id_of(&self.type_name),
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

/// Metadata for one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    type_id: u64,
    type_name: String,
    field_names: Vec<String>,
}

impl RecordType {
    /// Type metadata describing exactly the fields of `record`
    pub fn of(record: &BinaryRecord) -> Self {
        Self {
            type_id: record.type_id,
            type_name: record.type_name.clone(),
            field_names: record.fields.keys().cloned().collect(),
        }
    }

    pub fn type_id(&self) -> u64 {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Add field names from `record` that are not known yet.
    /// Returns whether anything was added.
    fn merge(&mut self, record: &BinaryRecord) -> bool {
        let mut changed = false;
        for name in record.fields.keys() {
            if !self.field_names.iter().any(|known| known == name) {
                self.field_names.push(name.clone());
                changed = true;
            }
        }
        changed
    }

    /// Resolve an accessor for `name` on this type
    pub fn field(&self, name: &str) -> FieldAccessor {
        FieldAccessor {
            type_id: self.type_id,
            name: name.to_string(),
        }
    }
}

/// Resolved handle reading one field from records of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    type_id: u64,
    name: String,
}

impl FieldAccessor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> u64 {
        self.type_id
    }

    /// The field's value, or `None` when it is null, absent, or the record
    /// belongs to a different type
    pub fn value<'a>(&self, record: &'a BinaryRecord) -> Option<&'a str> {
        if record.type_id != self.type_id {
            return None;
        }
        record.field(&self.name)
    }
}

/// Registry of record types, shared by everything attached to one manager
#[derive(Debug, Clone, Default)]
pub struct Binary {
    types: Arc<DashMap<u64, RecordType>>,
}

impl Binary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a record of the given type
    pub fn builder(&self, type_name: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(type_name)
    }

    /// Record the fields of `record` in its type's metadata
    pub fn register(&self, record: &BinaryRecord) {
        let mut entry = self
            .types
            .entry(record.type_id)
            .or_insert_with(|| RecordType::of(record));
        if entry.merge(record) {
            tracing::debug!(
                type_name = %record.type_name,
                fields = entry.field_names.len(),
                "record type metadata extended"
            );
        }
    }

    /// Registered metadata for the type of `record`
    pub fn type_of(&self, record: &BinaryRecord) -> Option<RecordType> {
        self.type_by_id(record.type_id)
    }

    pub fn type_by_id(&self, type_id: u64) -> Option<RecordType> {
        self.types.get(&type_id).map(|t| t.value().clone())
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
