//! Error type shared by every store in the crate.

use thiserror::Error;
use tracing::error;

use crate::storage::NodeId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by chunk stores and graph stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Appending would move a store past its addressable range.
    #[error("{store} capacity exceeded: requested {requested} units, limit {limit}")]
    CapacityExceeded {
        /// Which store or table ran out of room.
        store: &'static str,
        /// The offset, length or id that did not fit.
        requested: u64,
        /// The largest value the store accepts.
        limit: u64,
    },
    /// An invariant precondition does not hold.
    #[error("corrupt state: {0}")]
    CorruptState(String),
    /// A list element index at or past the end of the list.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested element number.
        index: u64,
        /// Current list size.
        len: u64,
    },
    /// A node id the node table never assigned.
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!(reason = %msg, "store.corrupt_state");
        StoreError::CorruptState(msg)
    }
}
