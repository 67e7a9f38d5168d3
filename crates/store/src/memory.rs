use crate::stats::{StoreStats, StoreStatsSnapshot};
use crate::traits::{EntryProcessor, KeyValueStore};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gridbench_core::Result;
use std::collections::{HashMap, HashSet};

/// Concurrent in-process store.
///
/// Entries live in a sharded map; [`KeyValueStore::invoke`] runs the entry
/// processor while holding the shard's write lock, so mutations of one key
/// are serialized.
pub struct MemoryStore<V> {
    name: String,
    entries: DashMap<String, V>,
    stats: StoreStats,
}

impl<V> MemoryStore<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            stats: StoreStats::default(),
        }
    }

    pub fn stats(&self) -> StoreStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear_entries(&self) {
        self.entries.clear();
    }
}

impl<V> std::fmt::Debug for MemoryStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("name", &self.name)
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

#[async_trait]
impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<V>> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        self.stats.record_get(value.is_some());
        Ok(value)
    }

    async fn get_all(&self, keys: &HashSet<String>) -> Result<HashMap<String, V>> {
        let found: HashMap<String, V> = keys
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key.clone(), entry.value().clone()))
            })
            .collect();
        self.stats.record_multi_get(keys.len(), found.len());
        Ok(found)
    }

    async fn put(&self, key: &str, value: V) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.stats.record_write();
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.stats.record_removal();
        }
        Ok(existed)
    }

    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn invoke(&self, key: &str, processor: &dyn EntryProcessor<V>) -> Result<()> {
        self.stats.record_invocation();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => match processor.process(key, Some(occupied.get()))? {
                Some(value) => {
                    occupied.insert(value);
                    self.stats.record_write();
                }
                None => {
                    occupied.remove();
                    self.stats.record_removal();
                }
            },
            Entry::Vacant(vacant) => {
                if let Some(value) = processor.process(key, None)? {
                    vacant.insert(value);
                    self.stats.record_write();
                }
            }
        }
        Ok(())
    }

    async fn size(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
