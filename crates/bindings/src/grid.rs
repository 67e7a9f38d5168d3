//! Grid binding: binary records in a single table with batched reads
//!
//! Reads either go straight to the store or, when a read threshold is
//! configured, are accumulated per client and resolved with one multi-key
//! fetch. Updates run as entry processors so concurrent writers of a key
//! never lose fields.

use crate::batch::{BatchRead, ReadBatch};
use crate::config::GridConfig;
use crate::projection::FieldProjector;
use crate::updater::FieldUpdater;
use async_trait::async_trait;
use gridbench_core::{Db, Error, Fields, Result, Status};
use gridbench_store::{Binary, BinaryRecord, CacheManager, KeyValueStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// State shared by every [`GridClient`] of a run
pub struct GridShared {
    config: GridConfig,
    store: Arc<dyn KeyValueStore<BinaryRecord>>,
    binary: Binary,
    projector: FieldProjector,
}

impl GridShared {
    pub fn new(
        config: GridConfig,
        store: Arc<dyn KeyValueStore<BinaryRecord>>,
        binary: Binary,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            binary,
            projector: FieldProjector::new(),
        })
    }

    /// Shared state over the manager's cache for the configured table
    pub fn from_manager(config: GridConfig, manager: &CacheManager<BinaryRecord>) -> Arc<Self> {
        let store = manager.cache(&config.table);
        Self::new(config, store, manager.binary().clone())
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore<BinaryRecord>> {
        &self.store
    }

    pub fn projector(&self) -> &FieldProjector {
        &self.projector
    }
}

impl std::fmt::Debug for GridShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridShared")
            .field("config", &self.config)
            .field("store", &self.store.name())
            .field("projector", &self.projector)
            .finish()
    }
}

/// Per-worker grid client
#[derive(Debug)]
pub struct GridClient {
    shared: Arc<GridShared>,
    batch: Option<ReadBatch>,
    served: u64,
}

impl GridClient {
    pub fn new(shared: Arc<GridShared>) -> Self {
        Self {
            shared,
            batch: None,
            served: 0,
        }
    }

    /// Records resolved by batched fetches issued from this client, including
    /// the ones whose values were not handed back to a caller
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Keys waiting in this client's batch
    pub fn pending(&self) -> usize {
        self.batch.as_ref().map_or(0, ReadBatch::len)
    }

    fn project(
        &self,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        record: &BinaryRecord,
        result: &mut Fields,
    ) {
        self.shared
            .projector
            .project(&self.shared.binary, record, fields, result);

        if self.shared.config.debug {
            info!(table, key, fields = ?fields, result = ?result, "projected record");
        }
    }

    async fn read_single(
        &mut self,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> Status {
        match self.shared.store.get(key).await {
            Ok(Some(record)) => {
                self.project(table, key, fields, &record, result);
                Status::Ok
            }
            Ok(None) => Status::NotFound,
            Err(e) => {
                error!(operation = "read", key, error = %e, "Error reading key");
                Status::Error
            }
        }
    }

    async fn read_batched(
        &mut self,
        threshold: usize,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> Status {
        let batch = self
            .batch
            .get_or_insert_with(|| ReadBatch::new(threshold));

        match batch.read(self.shared.store.as_ref(), key).await {
            BatchRead::Pending { pending } => {
                debug!(key, pending, threshold, "read queued for batched fetch");
                Status::BatchedOk
            }
            BatchRead::Failed { requested, error } => {
                error!(operation = "read", key, requested, error = %error, "Error reading key batch");
                Status::Error
            }
            BatchRead::Fetched { requested, records } => {
                debug!(key, requested, fetched = records.len(), "batched fetch completed");
                if records.is_empty() {
                    return Status::NotFound;
                }
                if records.len() < requested {
                    debug!(
                        key,
                        missing = requested - records.len(),
                        "batched fetch left keys unresolved"
                    );
                }
                self.served += records.len() as u64;

                match records.get(key) {
                    Some(record) => self.project(table, key, fields, record, result),
                    None => {
                        if let Some(record) = records.values().next() {
                            self.shared.projector.observe(record);
                        }
                    }
                }
                Status::Ok
            }
        }
    }

    async fn try_insert(&self, table: &str, key: &str, values: &Fields) -> Result<()> {
        let config = &self.shared.config;
        if table != config.table {
            return Err(Error::unsupported_table(table, config.table.as_str()));
        }

        let mut builder = self.shared.binary.builder(config.record_type.as_str());
        for (name, value) in values {
            builder.set_field(name.as_str(), value.as_str());
            if config.debug {
                info!(field = %name, value = %value, "insert field");
            }
        }
        let record = builder.build();
        self.shared.binary.register(&record);
        self.shared.store.put(key, record).await
    }
}

#[async_trait]
impl Db for GridClient {
    async fn cleanup(&mut self) -> Result<()> {
        if let Some(batch) = self.batch.as_mut() {
            let discarded = batch.discard();
            if discarded > 0 {
                debug!(discarded, "dropping unresolved batched reads");
            }
        }
        Ok(())
    }

    async fn read(
        &mut self,
        table: &str,
        key: &str,
        fields: Option<&HashSet<String>>,
        result: &mut Fields,
    ) -> Status {
        match self.shared.config.read_threshold() {
            Some(threshold) => self.read_batched(threshold, table, key, fields, result).await,
            None => self.read_single(table, key, fields, result).await,
        }
    }

    async fn scan(
        &mut self,
        _table: &str,
        _start_key: &str,
        _record_count: usize,
        _fields: Option<&HashSet<String>>,
        _result: &mut Vec<Fields>,
    ) -> Status {
        Status::NotImplemented
    }

    async fn update(&mut self, _table: &str, key: &str, values: &Fields) -> Status {
        let updater = FieldUpdater::new(
            self.shared.config.record_type.as_str(),
            values,
            self.shared.binary.clone(),
        );
        match self.shared.store.invoke(key, &updater).await {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(operation = "update", key, error = %e, "Error updating key");
                Status::Error
            }
        }
    }

    async fn insert(&mut self, table: &str, key: &str, values: &Fields) -> Status {
        match self.try_insert(table, key, values).await {
            Ok(()) => Status::Ok,
            Err(e) => {
                error!(operation = "insert", key, error = %e, "Error inserting key");
                Status::Error
            }
        }
    }

    async fn delete(&mut self, _table: &str, key: &str) -> Status {
        match self.shared.store.remove(key).await {
            Ok(_) => Status::Ok,
            Err(e) => {
                error!(operation = "delete", key, error = %e, "Error deleting key");
                Status::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_store::MemoryStore;

    fn client(fetch_size: i64) -> (GridClient, Arc<MemoryStore<BinaryRecord>>) {
        let store: Arc<MemoryStore<BinaryRecord>> = Arc::new(MemoryStore::new("usertable"));
        let shared = GridShared::new(
            GridConfig::default().with_fetch_size(fetch_size),
            store.clone(),
            Binary::new(),
        );
        (GridClient::new(shared), store)
    }

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn batch_is_created_lazily() {
        let (mut client, _store) = client(3);
        assert!(client.batch.is_none());

        let mut result = Fields::new();
        client.read("usertable", "a", None, &mut result).await;
        assert_eq!(client.batch.as_ref().map(ReadBatch::threshold), Some(3));
        assert_eq!(client.pending(), 1);
    }

    #[tokio::test]
    async fn flush_counts_every_served_record() {
        let (mut client, _store) = client(3);
        for key in ["a", "b", "c"] {
            client
                .insert("usertable", key, &fields(&[("f", key)]))
                .await;
        }

        let mut result = Fields::new();
        client.read("usertable", "a", None, &mut result).await;
        client.read("usertable", "b", None, &mut result).await;
        let status = client.read("usertable", "c", None, &mut result).await;

        assert_eq!(status, Status::Ok);
        assert_eq!(client.served(), 3);
        assert_eq!(result, fields(&[("f", "c")]));
    }

    #[tokio::test]
    async fn triggering_key_absent_returns_ok_without_fields() {
        let (mut client, _store) = client(2);
        client
            .insert("usertable", "present", &fields(&[("f", "v")]))
            .await;

        let mut result = Fields::new();
        client.read("usertable", "present", None, &mut result).await;
        let status = client.read("usertable", "absent", None, &mut result).await;

        assert_eq!(status, Status::Ok);
        assert!(result.is_empty());
        assert!(client.shared.projector().type_id().is_some());
    }

    #[tokio::test]
    async fn cleanup_discards_pending_reads() {
        let (mut client, store) = client(4);
        let mut result = Fields::new();
        client.read("usertable", "a", None, &mut result).await;
        client.cleanup().await.unwrap();

        assert_eq!(client.pending(), 0);
        assert_eq!(store.stats().multi_gets, 0);
    }

    #[tokio::test]
    async fn scan_is_not_implemented() {
        let (mut client, _store) = client(-1);
        let mut rows = Vec::new();
        let status = client.scan("usertable", "a", 10, None, &mut rows).await;
        assert_eq!(status, Status::NotImplemented);
    }
}
