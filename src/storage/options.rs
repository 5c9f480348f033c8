use std::sync::Arc;

use crate::storage::chunk::ChunkStoreOptions;
use crate::storage::metrics::StorageMetrics;

/// Configuration options supplied when opening a [`super::GraphStore`].
#[derive(Clone, Default)]
pub struct GraphOptions {
    /// Code units to preallocate in the out-edge store.
    pub out_capacity_hint: usize,
    /// Code units to preallocate in the in-edge store.
    pub in_capacity_hint: usize,
    /// Node slots to preallocate in the head arrays.
    pub node_capacity_hint: usize,
    /// Optional cap on each chunk store's write cursor.
    pub max_units: Option<u64>,
    /// Optional metrics collection implementation.
    pub metrics: Option<Arc<dyn StorageMetrics>>,
}

impl GraphOptions {
    /// Creates a new GraphOptions with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the preallocation of the out-edge store.
    pub fn out_capacity_hint(mut self, units: usize) -> Self {
        self.out_capacity_hint = units;
        self
    }

    /// Sets the preallocation of the in-edge store.
    pub fn in_capacity_hint(mut self, units: usize) -> Self {
        self.in_capacity_hint = units;
        self
    }

    /// Sets the expected number of nodes.
    pub fn node_capacity_hint(mut self, nodes: usize) -> Self {
        self.node_capacity_hint = nodes;
        self
    }

    /// Caps each chunk store at `units` code units.
    pub fn max_units(mut self, units: u64) -> Self {
        self.max_units = Some(units);
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn StorageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub(crate) fn chunk_options(&self, capacity_hint: usize) -> ChunkStoreOptions {
        ChunkStoreOptions {
            capacity_hint,
            max_units: self.max_units,
        }
    }
}
