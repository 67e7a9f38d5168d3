//! Named cache manager
//!
//! Owns the named stores of one logical cluster plus the record type
//! registry shared by everything stored in it.

use crate::memory::MemoryStore;
use crate::record::Binary;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Manager of named [`MemoryStore`]s
pub struct CacheManager<V> {
    name: String,
    caches: DashMap<String, Arc<MemoryStore<V>>>,
    binary: Binary,
    running: AtomicBool,
}

impl<V> CacheManager<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caches: DashMap::new(),
            binary: Binary::new(),
            running: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the cache with the given name, creating it on first use
    pub fn cache(&self, name: &str) -> Arc<MemoryStore<V>> {
        if let Some(cache) = self.caches.get(name) {
            return Arc::clone(cache.value());
        }
        Arc::clone(
            self.caches
                .entry(name.to_string())
                .or_insert_with(|| {
                    debug!(manager = %self.name, cache = name, "creating cache");
                    Arc::new(MemoryStore::new(name))
                })
                .value(),
        )
    }

    /// Create a cache explicitly. Returns `false` when it already existed.
    pub fn create_cache(&self, name: &str) -> bool {
        let mut created = false;
        self.caches.entry(name.to_string()).or_insert_with(|| {
            created = true;
            info!(manager = %self.name, cache = name, "created cache");
            Arc::new(MemoryStore::new(name))
        });
        created
    }

    pub fn contains_cache(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Names of every cache, sorted
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.iter().map(|c| c.key().clone()).collect();
        names.sort();
        names
    }

    /// Record type registry for this manager
    pub fn binary(&self) -> &Binary {
        &self.binary
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the manager and drop the contents of every cache.
    /// Handles obtained earlier stay usable but see empty caches.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            for cache in self.caches.iter() {
                cache.value().clear_entries();
            }
            info!(manager = %self.name, caches = self.caches.len(), "cache manager stopped");
        }
    }
}

impl<V> std::fmt::Debug for CacheManager<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("name", &self.name)
            .field("caches", &self.caches.len())
            .field("running", &self.is_running())
            .finish()
    }
}
