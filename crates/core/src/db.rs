//! The CRUD surface a benchmark harness drives

use crate::errors::Result;
use crate::status::Status;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Field name to value map used for inputs and read results
pub type Fields = HashMap<String, String>;

/// A database binding as seen by the benchmark harness.
///
/// Each worker owns its own instance, so per-worker state (such as a pending
/// read batch) lives on `self` and needs no locking. Instances created for the
/// same run may share a store handle internally.
#[async_trait]
pub trait Db: Send {
    /// Prepare the binding before the first operation
    async fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release resources once the worker is done
    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read a record.
    ///
    /// `fields` selects the fields to return; `None` or an empty set means
    /// all of them. Found values are written into `result`.
    async fn read(
        &mut self,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> Status;

    /// Scan `record_count` records starting at `start_key`
    async fn scan(
        &mut self,
        table: &str,
        start_key: &str,
        record_count: usize,
        fields: Option<&HashSet<String>>,
        result: &mut Vec<Fields>,
    ) -> Status;

    /// Overwrite the given fields of a record, leaving the others untouched
    async fn update(&mut self, table: &str, key: &str, values: &Fields) -> Status;

    /// Write a new record
    async fn insert(&mut self, table: &str, key: &str, values: &Fields) -> Status;

    /// Remove a record
    async fn delete(&mut self, table: &str, key: &str) -> Status;
}
