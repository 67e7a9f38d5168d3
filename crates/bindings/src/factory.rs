//! Binding selection and per-worker client creation

use crate::config::GridConfig;
use crate::grid::{GridClient, GridShared};
use crate::named::NamedCacheClient;
use crate::remote::{RemoteCacheManager, RemoteCacheManagerHolder, RemoteClient};
use gridbench_core::{Db, Error, Fields, Properties, Result};
use gridbench_store::{BinaryRecord, CacheManager};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// The bindings a run can use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindingKind {
    /// Binary records with batched reads (default)
    #[default]
    Grid,
    /// Map-valued records, one cache per table
    Named,
    /// JSON records under composite keys in one shared cache
    Remote,
}

impl BindingKind {
    pub const NAMES: [&'static str; 3] = ["grid", "named", "remote"];
}

impl FromStr for BindingKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "grid" => Ok(BindingKind::Grid),
            "named" => Ok(BindingKind::Named),
            "remote" => Ok(BindingKind::Remote),
            _ => Err(Error::unknown_binding(value, &Self::NAMES)),
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingKind::Grid => "grid",
            BindingKind::Named => "named",
            BindingKind::Remote => "remote",
        };
        write!(f, "{}", name)
    }
}

enum Backend {
    Grid {
        manager: Arc<CacheManager<BinaryRecord>>,
        shared: Arc<GridShared>,
    },
    Named(Arc<CacheManager<Fields>>),
    Remote(Arc<RemoteCacheManager>),
}

/// Builds clients that share one backing store
pub struct BindingFactory {
    kind: BindingKind,
    backend: Backend,
}

impl BindingFactory {
    pub fn new(name: &str, props: &Properties) -> Result<Self> {
        let kind: BindingKind = name.parse()?;
        let backend = match kind {
            BindingKind::Grid => {
                let config = GridConfig::from_properties(props)?;
                info!(
                    table = %config.table,
                    record_type = %config.record_type,
                    read_threshold = ?config.read_threshold(),
                    "grid binding configured"
                );
                let manager = Arc::new(CacheManager::new("grid"));
                let shared = GridShared::from_manager(config, &manager);
                Backend::Grid { manager, shared }
            }
            BindingKind::Named => Backend::Named(Arc::new(CacheManager::new("named"))),
            BindingKind::Remote => Backend::Remote(RemoteCacheManagerHolder::get_instance(props)?),
        };
        Ok(Self { kind, backend })
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// A fresh client for one worker
    pub fn create(&self) -> Box<dyn Db> {
        match &self.backend {
            Backend::Grid { shared, .. } => Box::new(GridClient::new(Arc::clone(shared))),
            Backend::Named(manager) => Box::new(NamedCacheClient::new(Arc::clone(manager))),
            Backend::Remote(manager) => Box::new(RemoteClient::with_manager(manager)),
        }
    }

    /// Stop the embedded managers. The process-wide remote manager outlives
    /// any one factory and is left running.
    pub fn shutdown(&self) {
        match &self.backend {
            Backend::Grid { manager, .. } => manager.stop(),
            Backend::Named(manager) => manager.stop(),
            Backend::Remote(_) => {}
        }
    }
}

impl fmt::Debug for BindingFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingFactory")
            .field("kind", &self.kind)
            .finish()
    }
}
