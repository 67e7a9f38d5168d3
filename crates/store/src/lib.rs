//! Store collaborator for the gridbench bindings
//!
//! This crate provides:
//! - The `KeyValueStore` contract bindings talk to, including atomic
//!   entry-processor mutation
//! - A binary record model with per-type metadata and field accessors
//! - `MemoryStore`, a concurrent in-process store
//! - `CacheManager`, which owns named stores and the record type registry

pub mod manager;
pub mod memory;
pub mod record;
pub mod stats;
pub mod traits;

pub use manager::CacheManager;
pub use memory::MemoryStore;
pub use record::{type_id_of, Binary, BinaryRecord, FieldAccessor, RecordBuilder, RecordType};
pub use stats::{StoreStats, StoreStatsSnapshot};
pub use traits::{EntryProcessor, KeyValueStore};
