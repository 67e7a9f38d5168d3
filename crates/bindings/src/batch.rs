//! Batched read accumulation
//!
//! A [`ReadBatch`] belongs to one worker. Keys are collected until the batch
//! reaches its threshold; the read that fills it issues a single multi-key
//! fetch and the batch is cleared whatever the outcome.

use gridbench_core::Error;
use gridbench_store::KeyValueStore;
use std::collections::{HashMap, HashSet};

/// Result of submitting one key to a [`ReadBatch`]
#[derive(Debug)]
pub enum BatchRead<V> {
    /// The key was queued; `pending` keys are now waiting
    Pending { pending: usize },
    /// The batch was flushed. `records` holds every requested key that exists.
    Fetched {
        requested: usize,
        records: HashMap<String, V>,
    },
    /// The multi-key fetch failed; the batch has been cleared anyway
    Failed { requested: usize, error: Error },
}

/// Per-worker set of keys awaiting a multi-key fetch
#[derive(Debug)]
pub struct ReadBatch {
    keys: HashSet<String>,
    threshold: usize,
}

impl ReadBatch {
    /// Create a batch that flushes once `threshold` distinct keys are pending.
    /// A threshold of zero behaves like one.
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            keys: HashSet::with_capacity(threshold),
            threshold,
        }
    }

    /// Submit a key. Flushes through `store` when the batch becomes full.
    pub async fn read<V, S>(&mut self, store: &S, key: &str) -> BatchRead<V>
    where
        V: Clone + Send + Sync + 'static,
        S: KeyValueStore<V> + ?Sized,
    {
        self.keys.insert(key.to_string());
        if !self.is_full() {
            return BatchRead::Pending {
                pending: self.keys.len(),
            };
        }

        let requested = self.keys.len();
        let fetched = store.get_all(&self.keys).await;
        self.keys.clear();

        match fetched {
            Ok(records) => BatchRead::Fetched { requested, records },
            Err(error) => BatchRead::Failed { requested, error },
        }
    }

    /// Get the number of pending keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the batch is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check if the batch is full
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.threshold
    }

    /// Get the configured threshold
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether `key` is waiting in this batch
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Drop pending keys without fetching them, returning how many there were
    pub fn discard(&mut self) -> usize {
        let pending = self.keys.len();
        self.keys.clear();
        pending
    }
}
