//! Chunk stores and the adjacency model built on them.
//!
//! [`ChunkStore`] packs variable-length, fixed-length and linked-list records
//! into one append-only buffer of 16-bit code units. [`GraphStore`] maps node
//! keys to dense ids and keeps each node's in- and out-edges as lists in two
//! chunk stores.

/// Key to node id interning.
pub mod catalog;

/// Append-only record store generic over offset width.
///
/// Implements the variable, fixed and list record encodings for both the
/// 32-bit and the 64-bit addressing scheme.
pub mod chunk;

/// Adjacency model over a pair of chunk stores.
pub mod graph;

/// Serializable store images.
pub mod snapshot;

mod metrics;
mod options;
mod types;

pub use catalog::NodeTable;

/// Chunk store and its addressing widths.
pub use chunk::{
    ChunkStore, ChunkStoreOptions, ListIter, Narrow, NarrowChunkStore, OffsetWidth, Wide,
    WideChunkStore,
};

/// Graph store and its cursor.
pub use graph::{EdgeCursor, GraphStore, NarrowGraphStore, WideGraphStore};

/// Metrics collection.
pub use metrics::{default_metrics, CounterMetrics, NoopMetrics, StorageMetrics};

/// Graph configuration options.
pub use options::GraphOptions;

pub use snapshot::{ChunkImage, GraphImage};

/// Node, edge and direction types.
pub use types::{AdjState, Dir, Edge, NodeId, EDGE_UNITS};
