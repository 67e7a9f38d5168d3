//! Store contract used by the bindings
//!
//! Everything a binding needs from the backing store: single and multi-key
//! reads, writes, removal, and atomic mutation of one entry through an
//! [`EntryProcessor`].

use async_trait::async_trait;
use gridbench_core::Result;
use std::collections::{HashMap, HashSet};

/// A function applied by the store to the current value of one key while the
/// store holds exclusive access to that key.
///
/// Returning `Ok(Some(value))` stores `value`, `Ok(None)` leaves the key
/// absent. An error aborts the mutation and leaves the entry unchanged.
pub trait EntryProcessor<V>: Send + Sync {
    fn process(&self, key: &str, current: Option<&V>) -> Result<Option<V>>;
}

/// Key-value store handle shared by every worker of a run.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait KeyValueStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Name of the cache this handle points at
    fn name(&self) -> &str;

    /// Get a single value
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Fetch several keys at once. Keys that do not exist are left out of the
    /// returned map.
    ///
    /// Default implementation calls get() for each key sequentially.
    /// Implementations should override this for better performance.
    async fn get_all(&self, keys: &HashSet<String>) -> Result<HashMap<String, V>> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(key).await? {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    /// Store a value unconditionally
    async fn put(&self, key: &str, value: V) -> Result<()>;

    /// Remove a key. Returns whether it existed; a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Check if a key exists
    async fn contains_key(&self, key: &str) -> Result<bool>;

    /// Run `processor` against the entry for `key` under exclusive access
    async fn invoke(&self, key: &str, processor: &dyn EntryProcessor<V>) -> Result<()>;

    /// Number of entries
    async fn size(&self) -> Result<usize>;

    /// Remove every entry
    async fn clear(&self) -> Result<()>;
}
