//! Entry processors that merge field updates into stored records
//!
//! Each processor is a pure function from the current value to the merged
//! value; the store runs it with exclusive access to the key.

use gridbench_core::{Fields, Result};
use gridbench_store::{Binary, BinaryRecord, EntryProcessor, RecordBuilder};

/// Overwrites the given fields of a [`BinaryRecord`], creating the record
/// when the key is absent
#[derive(Debug, Clone)]
pub struct FieldUpdater {
    record_type: String,
    fields: Vec<(String, String)>,
    binary: Binary,
}

impl FieldUpdater {
    pub fn new(record_type: impl Into<String>, values: &Fields, binary: Binary) -> Self {
        Self {
            record_type: record_type.into(),
            fields: values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            binary,
        }
    }
}

impl EntryProcessor<BinaryRecord> for FieldUpdater {
    fn process(&self, _key: &str, current: Option<&BinaryRecord>) -> Result<Option<BinaryRecord>> {
        let mut builder = match current {
            Some(record) => record.to_builder(),
            None => RecordBuilder::new(self.record_type.as_str()),
        };
        for (name, value) in &self.fields {
            builder.set_field(name.as_str(), value.as_str());
        }
        let record = builder.build();
        self.binary.register(&record);
        Ok(Some(record))
    }
}

/// Merges values into a map-valued record
#[derive(Debug, Clone)]
pub struct MapMerge {
    values: Fields,
}

impl MapMerge {
    pub fn new(values: &Fields) -> Self {
        Self {
            values: values.clone(),
        }
    }
}

impl EntryProcessor<Fields> for MapMerge {
    fn process(&self, _key: &str, current: Option<&Fields>) -> Result<Option<Fields>> {
        let mut merged = current.cloned().unwrap_or_default();
        merged.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(Some(merged))
    }
}

/// Merges values into a record stored as a JSON object string
#[derive(Debug, Clone)]
pub struct JsonMerge {
    values: Fields,
}

impl JsonMerge {
    pub fn new(values: &Fields) -> Self {
        Self {
            values: values.clone(),
        }
    }
}

impl EntryProcessor<String> for JsonMerge {
    fn process(&self, _key: &str, current: Option<&String>) -> Result<Option<String>> {
        let mut merged: Fields = match current {
            Some(encoded) => serde_json::from_str(encoded)?,
            None => Fields::new(),
        };
        merged.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(Some(serde_json::to_string(&merged)?))
    }
}
