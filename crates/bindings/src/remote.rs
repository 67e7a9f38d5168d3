//! Remote-style binding over a process-wide cache manager
//!
//! Every table shares the one configured cache; keys are prefixed with the
//! table name and records are stored as JSON objects.

use crate::config::RemoteConfig;
use crate::named::select_fields;
use crate::updater::JsonMerge;
use async_trait::async_trait;
use gridbench_core::{Db, Fields, Properties, Result, Status};
use gridbench_store::{CacheManager, KeyValueStore};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Cache manager for a remote cluster, with the connection settings it was
/// created from
#[derive(Debug)]
pub struct RemoteCacheManager {
    config: RemoteConfig,
    manager: CacheManager<String>,
}

impl RemoteCacheManager {
    /// Create the manager and make sure the configured cache exists
    pub fn new(config: RemoteConfig) -> Self {
        info!(
            address = %config.address(),
            user = config.user.as_deref().unwrap_or("<none>"),
            cache = %config.cache_name,
            "creating remote cache manager"
        );
        let manager = CacheManager::new(config.address());
        if !manager.contains_cache(&config.cache_name) {
            manager.create_cache(&config.cache_name);
        }
        Self { config, manager }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Handle to the configured cache
    pub fn cache(&self) -> Arc<dyn KeyValueStore<String>> {
        self.manager.cache(&self.config.cache_name)
    }

    pub fn cache_names(&self) -> Vec<String> {
        self.manager.cache_names()
    }
}

static REMOTE_MANAGER: OnceCell<Arc<RemoteCacheManager>> = OnceCell::new();

/// Process-wide [`RemoteCacheManager`]
pub struct RemoteCacheManagerHolder;

impl RemoteCacheManagerHolder {
    /// The shared manager, created from `props` on first call.
    /// Later calls return the same manager whatever properties they pass.
    pub fn get_instance(props: &Properties) -> Result<Arc<RemoteCacheManager>> {
        REMOTE_MANAGER
            .get_or_try_init(|| {
                RemoteConfig::from_properties(props)
                    .map(|config| Arc::new(RemoteCacheManager::new(config)))
            })
            .cloned()
    }
}

/// Binding storing JSON-encoded records under `table-key` keys
pub struct RemoteClient {
    cache: Arc<dyn KeyValueStore<String>>,
}

impl RemoteClient {
    /// Client on the process-wide manager
    pub fn new(props: &Properties) -> Result<Self> {
        let manager = RemoteCacheManagerHolder::get_instance(props)?;
        Ok(Self::with_manager(&manager))
    }

    pub fn with_manager(manager: &RemoteCacheManager) -> Self {
        Self {
            cache: manager.cache(),
        }
    }

    fn composite_key(table: &str, key: &str) -> String {
        format!("{table}-{key}")
    }

    async fn try_read(&self, key: &str) -> Result<Option<Fields>> {
        if !self.cache.contains_key(key).await? {
            return Ok(None);
        }
        match self.cache.get(key).await? {
            Some(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
            None => Ok(None),
        }
    }

    async fn try_insert(&self, key: &str, values: &Fields) -> Result<()> {
        let encoded = serde_json::to_string(values)?;
        self.cache.put(key, encoded).await
    }
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("cache", &self.cache.name())
            .finish()
    }
}

#[async_trait]
impl Db for RemoteClient {
    async fn read(
        &mut self,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> Status {
        let key = Self::composite_key(table, key);
        match self.try_read(&key).await {
            Ok(Some(row)) => {
                select_fields(row, fields, result);
                Status::Ok
            }
            Ok(None) => Status::NotFound,
            Err(e) => {
                error!(operation = "read", key = %key, error = %e, "Error reading key");
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
        warn!(table, start_key, record_count, "remote caches do not support scan semantics");
        Status::Error
    }

    async fn update(&mut self, table: &str, key: &str, values: &Fields) -> Status {
        let key = Self::composite_key(table, key);
        match self.cache.invoke(&key, &JsonMerge::new(values)).await {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(operation = "update", key = %key, error = %e, "Error updating key");
                Status::Error
            }
        }
    }

    async fn insert(&mut self, table: &str, key: &str, values: &Fields) -> Status {
        let key = Self::composite_key(table, key);
        match self.try_insert(&key, values).await {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(operation = "insert", key = %key, error = %e, "Error inserting key");
                Status::Error
            }
        }
    }

    async fn delete(&mut self, table: &str, key: &str) -> Status {
        let key = Self::composite_key(table, key);
        match self.cache.remove(&key).await {
            Ok(_) => Status::Ok,
            Err(e) => {
                error!(operation = "delete", key = %key, error = %e, "Error deleting key");
                Status::Error
            }
        }
    }
}
