//! Field projection for binary records
//!
//! The first record seen fixes the record type id for the run. Field names for
//! selection-free reads are looked up in the type registry on every
//! projection, so fields added by later inserts and updates are included.
//! Field accessors are resolved lazily and memoized by field name. Every
//! client built from the same shared state uses one projector.

use dashmap::DashMap;
use gridbench_core::Fields;
use gridbench_store::{Binary, BinaryRecord, FieldAccessor, RecordType};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// Projects requested fields of a [`BinaryRecord`] into a [`Fields`] map
#[derive(Debug, Default)]
pub struct FieldProjector {
    type_id: OnceCell<u64>,
    accessors: DashMap<String, FieldAccessor>,
}

impl FieldProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type id fixed for this run, if any record was seen yet
    pub fn type_id(&self) -> Option<u64> {
        self.type_id.get().copied()
    }

    /// Current metadata of the run's record type
    pub fn record_type(&self, binary: &Binary) -> Option<RecordType> {
        self.type_id().and_then(|id| binary.type_by_id(id))
    }

    /// Fix the run's type id from `record` unless one is already known
    pub fn observe(&self, record: &BinaryRecord) -> u64 {
        *self.type_id.get_or_init(|| record.type_id())
    }

    /// Number of memoized accessors
    pub fn cached_accessors(&self) -> usize {
        self.accessors.len()
    }

    /// Registered metadata for the run's type, or the shape of `record` when
    /// it is of that type but nothing was registered
    fn resolve(&self, binary: &Binary, record: &BinaryRecord) -> Option<RecordType> {
        let type_id = self.observe(record);
        binary
            .type_by_id(type_id)
            .or_else(|| (record.type_id() == type_id).then(|| RecordType::of(record)))
    }

    fn accessor(&self, record_type: &RecordType, name: &str) -> FieldAccessor {
        if let Some(accessor) = self.accessors.get(name) {
            return accessor.value().clone();
        }
        // Concurrent callers may resolve the same field; either result is equivalent.
        self.accessors
            .entry(name.to_string())
            .or_insert_with(|| record_type.field(name))
            .value()
            .clone()
    }

    /// Write the selected fields of `record` into `result`.
    ///
    /// `fields` of `None` or an empty set selects every field currently
    /// registered for the run's record type. Null or missing values are left
    /// out. Returns the number of fields written.
    pub fn project(
        &self,
        binary: &Binary,
        record: &BinaryRecord,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> usize {
        let Some(record_type) = self.resolve(binary, record) else {
            return 0;
        };
        let mut written = 0;

        let mut project_one = |name: &str| {
            if let Some(value) = self.accessor(&record_type, name).value(record) {
                result.insert(name.to_string(), value.to_string());
                written += 1;
            }
        };

        match fields {
            Some(requested) if !requested.is_empty() => {
                requested.iter().for_each(|name| project_one(name.as_str()));
            }
            _ => {
                record_type
                    .field_names()
                    .iter()
                    .for_each(|name| project_one(name.as_str()));
            }
        }

        written
    }
}
