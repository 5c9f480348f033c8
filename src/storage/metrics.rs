use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking graph store operations.
///
/// Implementations receive one call per interned node, per stored edge and
/// per adjacency read. They are shared behind an [`Arc`] and must be cheap.
pub trait StorageMetrics: Send + Sync {
    /// Records the allocation of a new node id.
    fn node_interned(&self);

    /// Records one edge stored in an out-list.
    fn edge_added(&self);

    /// Records a scan over a node's adjacency list.
    ///
    /// # Parameters
    /// * `direction` - "out" or "in".
    fn adjacency_scan(&self, direction: &'static str);

    /// Records a degree query.
    ///
    /// # Parameters
    /// * `direction` - "out" or "in".
    fn degree_query(&self, direction: &'static str);
}

/// A no-op implementation of [`StorageMetrics`].
#[derive(Default)]
pub struct NoopMetrics;

impl StorageMetrics for NoopMetrics {
    fn node_interned(&self) {}
    fn edge_added(&self) {}
    fn adjacency_scan(&self, _direction: &'static str) {}
    fn degree_query(&self, _direction: &'static str) {}
}

/// A thread-safe counter-based implementation of [`StorageMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of node ids allocated.
    pub nodes_interned: AtomicU64,

    /// Number of edges stored.
    pub edges_added: AtomicU64,

    /// Number of outgoing adjacency scans performed.
    pub adjacency_scans_out: AtomicU64,

    /// Number of incoming adjacency scans performed.
    pub adjacency_scans_in: AtomicU64,

    /// Number of outgoing degree queries performed.
    pub degree_queries_out: AtomicU64,

    /// Number of incoming degree queries performed.
    pub degree_queries_in: AtomicU64,
}

impl StorageMetrics for CounterMetrics {
    fn node_interned(&self) {
        self.nodes_interned.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_added(&self) {
        self.edges_added.fetch_add(1, Ordering::Relaxed);
    }

    fn adjacency_scan(&self, direction: &'static str) {
        match direction {
            "out" => {
                self.adjacency_scans_out.fetch_add(1, Ordering::Relaxed);
            }
            "in" => {
                self.adjacency_scans_in.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn degree_query(&self, direction: &'static str) {
        match direction {
            "out" => {
                self.degree_queries_out.fetch_add(1, Ordering::Relaxed);
            }
            "in" => {
                self.degree_queries_in.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

/// Returns the default metrics implementation, a [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn StorageMetrics> {
    Arc::new(NoopMetrics)
}
