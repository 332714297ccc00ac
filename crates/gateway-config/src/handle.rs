//! Swappable routing-table snapshot.

use crate::error::ConfigError;
use crate::loader::RoutingSource;
use crate::routing::RoutingTable;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

/// Shared handle to the current [`RoutingTable`].
///
/// Readers take an `Arc` snapshot and keep it for the whole request; a reload
/// swaps in a new table without affecting snapshots already handed out.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    current: Arc<ArcSwap<RoutingTable>>,
}

impl ConfigHandle {
    /// Wrap an initial table
    #[must_use]
    pub fn new(table: RoutingTable) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<RoutingTable> {
        self.current.load_full()
    }

    /// Replace the table
    pub fn replace(&self, table: RoutingTable) {
        self.current.store(Arc::new(table));
    }

    /// Rebuild from `source` and swap it in; the old table stays on failure
    pub async fn reload(&self, source: &RoutingSource) -> Result<(), ConfigError> {
        let table = source.load().await?;
        let models = table.model_count();
        self.replace(table);
        info!(models, "Routing table reloaded");
        Ok(())
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(RoutingTable::default())
    }
}
