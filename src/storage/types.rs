use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::primitives::bytes::units;

/// Dense node identifier assigned in first-seen order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

impl From<NodeId> for u32 {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Adjacency direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Dir {
    /// Edges leaving the node.
    Out,
    /// Edges arriving at the node.
    In,
}

impl Dir {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Out => "out",
            Dir::In => "in",
        }
    }
}

/// One adjacency entry: an application tag and the node on the other end.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Edge {
    /// Application-defined edge type, weight or count.
    pub tag: u32,
    /// The neighbour: target for out-edges, source for in-edges.
    pub neighbor: NodeId,
}

/// Code units of an encoded [`Edge`].
pub const EDGE_UNITS: usize = 2 * units::U32_UNITS;

impl Edge {
    /// Creates an edge entry.
    pub fn new(tag: u32, neighbor: NodeId) -> Self {
        Self { tag, neighbor }
    }

    /// Encodes as `[tag:2][neighbor:2]`.
    pub fn encode(&self) -> [u16; EDGE_UNITS] {
        let mut out = [0u16; EDGE_UNITS];
        units::put_u32(&mut out[..units::U32_UNITS], self.tag);
        units::put_u32(&mut out[units::U32_UNITS..], self.neighbor.0);
        out
    }

    /// Decodes an entry written by [`Edge::encode`].
    pub fn decode(src: &[u16]) -> Result<Self> {
        if src.len() != EDGE_UNITS {
            return Err(StoreError::corrupt(format!(
                "edge entry has {} units, expected {EDGE_UNITS}",
                src.len()
            )));
        }
        Ok(Self::decode_unchecked(src))
    }

    pub(crate) fn decode_unchecked(src: &[u16]) -> Self {
        debug_assert_eq!(src.len(), EDGE_UNITS, "edge entry length");
        Self {
            tag: units::get_u32(src),
            neighbor: NodeId(units::get_u32(&src[units::U32_UNITS..])),
        }
    }
}

/// Per-node, per-direction adjacency pointer.
///
/// The only transition is `Unset -> Bound` on the first edge for that
/// direction; edges are never removed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdjState<O> {
    /// No edge recorded yet.
    Unset,
    /// Head handle of the node's edge list.
    Bound(O),
}

impl<O> AdjState<O> {
    /// True once a list exists.
    pub fn is_bound(&self) -> bool {
        matches!(self, AdjState::Bound(_))
    }
}
