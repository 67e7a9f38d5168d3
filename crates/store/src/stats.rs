//! Store statistics with atomic counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by [`crate::MemoryStore`]
#[derive(Debug, Default)]
pub struct StoreStats {
    pub gets: AtomicU64,
    pub multi_gets: AtomicU64,
    pub keys_requested: AtomicU64,
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub writes: AtomicU64,
    pub removals: AtomicU64,
    pub invocations: AtomicU64,
}

impl StoreStats {
    pub fn record_get(&self, hit: bool) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.keys_requested.fetch_add(1, Ordering::Relaxed);
        self.record_lookup(hit);
    }

    pub fn record_multi_get(&self, requested: usize, found: usize) {
        self.multi_gets.fetch_add(1, Ordering::Relaxed);
        self.keys_requested
            .fetch_add(requested as u64, Ordering::Relaxed);
        self.hits.fetch_add(found as u64, Ordering::Relaxed);
        self.misses
            .fetch_add(requested.saturating_sub(found) as u64, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            multi_gets: self.multi_gets.load(Ordering::Relaxed),
            keys_requested: self.keys_requested.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StoreStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatsSnapshot {
    pub gets: u64,
    pub multi_gets: u64,
    pub keys_requested: u64,
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub removals: u64,
    pub invocations: u64,
}

impl StoreStatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
