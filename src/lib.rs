//! Compact append-only storage for large directed graphs with tagged edges.
//!
//! Node identity and adjacency are packed into flat buffers of 16-bit code
//! units instead of one heap object per edge. See [`storage::ChunkStore`] for
//! the record encodings and [`storage::GraphStore`] for the adjacency model.

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod primitives;
pub mod storage;

pub use error::{Result, StoreError};
pub use storage::{Dir, Edge, GraphOptions, GraphStore, NodeId};
