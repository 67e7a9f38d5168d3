//! Named-cache binding: one cache per table holding map-valued records

use crate::updater::MapMerge;
use async_trait::async_trait;
use gridbench_core::{Db, Fields, Result, Status};
use gridbench_store::{CacheManager, KeyValueStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Binding over a [`CacheManager`] whose values are field maps
#[derive(Debug)]
pub struct NamedCacheClient {
    manager: Arc<CacheManager<Fields>>,
}

impl NamedCacheClient {
    pub fn new(manager: Arc<CacheManager<Fields>>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<CacheManager<Fields>> {
        &self.manager
    }
}

/// Copy the requested fields of `row` into `result`; `None` or an empty
/// selection copies every field
pub(crate) fn select_fields(mut row: Fields, fields: Option<&HashSet<String>>, result: &mut Fields) {
    match fields {
        Some(requested) if !requested.is_empty() => {
            for name in requested {
                if let Some(value) = row.remove(name) {
                    result.insert(name.clone(), value);
                }
            }
        }
        _ => result.extend(row),
    }
}

#[async_trait]
impl Db for NamedCacheClient {
    async fn cleanup(&mut self) -> Result<()> {
        debug!(manager = %self.manager.name(), "named cache client released");
        Ok(())
    }

    async fn read(
        &mut self,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> Status {
        let cache = self.manager.cache(table);
        match cache.get(key).await {
            Ok(Some(row)) => {
                select_fields(row, fields, result);
                Status::Ok
            }
            Ok(None) => Status::NotFound,
            Err(e) => {
                error!(operation = "read", table, key, error = %e, "Error reading key");
                Status::Error
            }
        }
    }

    async fn scan(
        &mut self,
        table: &str,
        start_key: &str,
        record_count: usize,
        _fields: Option<&HashSet<String>>,
        _result: &mut Vec<Fields>,
    ) -> Status {
        warn!(table, start_key, record_count, "scan is not supported by named caches");
        Status::Ok
    }

    async fn update(&mut self, table: &str, key: &str, values: &Fields) -> Status {
        let cache = self.manager.cache(table);
        match cache.invoke(key, &MapMerge::new(values)).await {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(operation = "update", table, key, error = %e, "Error updating key");
                Status::Error
            }
        }
    }

    async fn insert(&mut self, table: &str, key: &str, values: &Fields) -> Status {
        let cache = self.manager.cache(table);
        match cache.put(key, values.clone()).await {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(operation = "insert", table, key, error = %e, "Error inserting key");
                Status::Error
            }
        }
    }

    async fn delete(&mut self, table: &str, key: &str) -> Status {
        let cache = self.manager.cache(table);
        match cache.remove(key).await {
            Ok(_) => Status::Ok,
            Err(e) => {
                error!(operation = "delete", table, key, error = %e, "Error deleting key");
                Status::Error
            }
        }
    }
}
