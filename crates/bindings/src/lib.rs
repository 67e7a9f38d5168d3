//! Benchmark bindings over key-value stores
//!
//! - `GridClient`: binary records in a single table, batched multi-key reads,
//!   entry-processor updates
//! - `NamedCacheClient`: map-valued records, one cache per table
//! - `RemoteClient`: composite `table-key` keys over a process-wide remote
//!   cache manager
//!
//! `BindingFactory` builds per-worker instances that share one store.

pub mod batch;
pub mod config;
pub mod factory;
pub mod grid;
pub mod named;
pub mod projection;
pub mod remote;
pub mod updater;

pub use batch::{BatchRead, ReadBatch};
pub use config::{GridConfig, RemoteConfig};
pub use factory::{BindingFactory, BindingKind};
pub use grid::{GridClient, GridShared};
pub use named::NamedCacheClient;
pub use projection::FieldProjector;
pub use remote::{RemoteCacheManager, RemoteCacheManagerHolder, RemoteClient};
pub use updater::{FieldUpdater, JsonMerge, MapMerge};
