#![forbid(unsafe_code)]
//! Adjacency model over a pair of chunk stores.
//!
//! Every node owns one head pointer per direction. A zero pointer means no
//! edge was recorded yet; otherwise it is the handle of a list in the out or
//! in chunk store whose elements are encoded [`Edge`]s.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Result, StoreError};
use crate::storage::catalog::NodeTable;
use crate::storage::chunk::{ChunkStore, ListIter, Narrow, OffsetWidth, Wide};
use crate::storage::metrics::{default_metrics, StorageMetrics};
use crate::storage::options::GraphOptions;
use crate::storage::types::{AdjState, Dir, Edge, NodeId, EDGE_UNITS};


/// Graph store backed by 32-bit chunk stores.
pub type NarrowGraphStore = GraphStore<Narrow>;
/// Graph store backed by 64-bit chunk stores.
pub type WideGraphStore = GraphStore<Wide>;

/// Compact append-only adjacency store.
///
/// Not synchronised: mutate from one thread, then share `&GraphStore` for
/// concurrent reads.
#[derive(Clone)]
pub struct GraphStore<W: OffsetWidth = Narrow> {
    pub(crate) nodes: NodeTable,
    pub(crate) out_store: ChunkStore<W>,
    pub(crate) in_store: ChunkStore<W>,
    pub(crate) out_heads: Vec<W::Offset>,
    pub(crate) in_heads: Vec<W::Offset>,
    pub(crate) edge_count: u64,
    pub(crate) metrics: Arc<dyn StorageMetrics>,
}

impl<W: OffsetWidth> Default for GraphStore<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: OffsetWidth> std::fmt::Debug for GraphStore<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("width", &W::NAME)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edge_count)
            .field("out_units", &self.out_store.write_cursor())
            .field("in_units", &self.in_store.write_cursor())
            .finish()
    }
}

impl<W: OffsetWidth> GraphStore<W> {
    /// Creates an empty store with default options.
    pub fn new() -> Self {
        Self {
            nodes: NodeTable::new(),
            out_store: ChunkStore::new(),
            in_store: ChunkStore::new(),
            out_heads: Vec::new(),
            in_heads: Vec::new(),
            edge_count: 0,
            metrics: default_metrics(),
        }
    }

    /// Creates an empty store configured by `opts`.
    pub fn open(opts: GraphOptions) -> Result<Self> {
        let out_store = ChunkStore::with_options(opts.chunk_options(opts.out_capacity_hint))?;
        let in_store = ChunkStore::with_options(opts.chunk_options(opts.in_capacity_hint))?;
        Ok(Self {
            nodes: NodeTable::new(),
            out_store,
            in_store,
            out_heads: Vec::with_capacity(opts.node_capacity_hint),
            in_heads: Vec::with_capacity(opts.node_capacity_hint),
            edge_count: 0,
            metrics: opts.metrics.unwrap_or_else(default_metrics),
        })
    }

    /// Replaces the metrics sink.
    pub fn set_metrics(&mut self, metrics: Arc<dyn StorageMetrics>) {
        self.metrics = metrics;
    }

    // ---- node identity ----

    /// Returns the id of `key`, allocating the next id if the key is new.
    pub fn intern_id(&mut self, key: &str) -> Result<NodeId> {
        let (id, created) = self.nodes.intern(key)?;
        if created {
            self.out_heads.push(W::Offset::default());
            self.in_heads.push(W::Offset::default());
            self.metrics.node_interned();
        }
        Ok(id)
    }

    /// Looks up the id of `key`.
    pub fn lookup_id(&self, key: &str) -> Option<NodeId> {
        self.nodes.lookup(key)
    }

    /// Number of node ids handed out.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges stored in out-lists.
    pub fn edge_count(&self) -> u64 {
        self.edge_count
    }

    /// `(key, id)` pairs ordered by key.
    pub fn keys(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.nodes.iter()
    }

    /// All ids in allocation order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + DoubleEndedIterator {
        // the node table caps its count at u32::MAX
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The chunk store holding lists for `dir`.
    pub fn chunk_store(&self, dir: Dir) -> &ChunkStore<W> {
        match dir {
            Dir::Out => &self.out_store,
            Dir::In => &self.in_store,
        }
    }

    // ---- bulk ingestion ----

    /// Stores `edges` as the complete `dir` adjacency of `id`, in the given order.
    ///
    /// May be called at most once per node and direction; a second call on a
    /// bound direction fails with [`StoreError::CorruptState`] and leaves the
    /// existing list untouched. An empty slice leaves the direction unset.
    pub fn set_edges(&mut self, id: NodeId, dir: Dir, edges: &[Edge]) -> Result<()> {
        self.check_node(id)?;
        if self.head(id, dir) != W::Offset::default() {
            return Err(StoreError::corrupt(format!(
                "{} edges of node {id} are already set",
                dir.as_str()
            )));
        }
        if let Some(missing) = edges.iter().find(|e| !self.nodes.contains(e.neighbor)) {
            return Err(StoreError::UnknownNode(missing.neighbor));
        }
        let encoded: Vec<[u16; EDGE_UNITS]> = edges.iter().map(Edge::encode).collect();
        let store = match dir {
            Dir::Out => &mut self.out_store,
            Dir::In => &mut self.in_store,
        };
        let Some(handle) = store.add_list_from(encoded.iter().map(|e| e.as_slice()))? else {
            trace!(node = id.0, dir = dir.as_str(), "graph.set_edges.empty");
            return Ok(());
        };
        *self.head_mut(id, dir) = handle;
        if dir == Dir::Out {
            self.edge_count += edges.len() as u64;
            for _ in edges {
                self.metrics.edge_added();
            }
        }
        debug!(
            node = id.0,
            dir = dir.as_str(),
            edges = edges.len(),
            handle = %handle,
            "graph.set_edges"
        );
        Ok(())
    }

    /// Like [`Self::set_edges`] but stores the edges in canonical order:
    /// ascending neighbour id, ties kept in submission order.
    pub fn set_edges_sorted(&mut self, id: NodeId, dir: Dir, edges: &[Edge]) -> Result<()> {
        let mut sorted = edges.to_vec();
        sorted.sort_by_key(|e| e.neighbor);
        self.set_edges(id, dir, &sorted)
    }

    /// Columnar form of [`Self::set_edges`]: `tags[i]` belongs to `neighbors[i]`.
    pub fn set_edges_columns(
        &mut self,
        id: NodeId,
        dir: Dir,
        tags: &[u32],
        neighbors: &[NodeId],
    ) -> Result<()> {
        if tags.len() != neighbors.len() {
            return Err(StoreError::corrupt(format!(
                "node {id}: {} tags but {} neighbours",
                tags.len(),
                neighbors.len()
            )));
        }
        let edges: Vec<Edge> = tags
            .iter()
            .zip(neighbors)
            .map(|(tag, neighbor)| Edge::new(*tag, *neighbor))
            .collect();
        self.set_edges(id, dir, &edges)
    }

    /// Stores the out-edges of `id` in submission order.
    pub fn set_out_edges(&mut self, id: NodeId, edges: &[Edge]) -> Result<()> {
        self.set_edges(id, Dir::Out, edges)
    }

    /// Stores the in-edges of `id` in submission order.
    pub fn set_in_edges(&mut self, id: NodeId, edges: &[Edge]) -> Result<()> {
        self.set_edges(id, Dir::In, edges)
    }

    /// Stores the out-edges of `id` in canonical order.
    pub fn set_out_edges_sorted(&mut self, id: NodeId, edges: &[Edge]) -> Result<()> {
        self.set_edges_sorted(id, Dir::Out, edges)
    }

    /// Stores the in-edges of `id` in canonical order.
    pub fn set_in_edges_sorted(&mut self, id: NodeId, edges: &[Edge]) -> Result<()> {
        self.set_edges_sorted(id, Dir::In, edges)
    }

    // ---- streaming ingestion ----

    /// Records the edge `from -> to` with `tag`, interning both keys as needed.
    ///
    /// The edge lands at the tail of `from`'s out-list and `to`'s in-list.
    pub fn add_edge(&mut self, from: &str, to: &str, tag: u32) -> Result<(NodeId, NodeId)> {
        let from_id = self.intern_id(from)?;
        let to_id = self.intern_id(to)?;
        self.add_edge_between(from_id, to_id, tag)?;
        Ok((from_id, to_id))
    }

    /// Records the edge `from -> to` between already interned ids.
    ///
    /// Room for both list entries is checked first, so a capacity failure
    /// leaves both lists unchanged.
    pub fn add_edge_between(&mut self, from: NodeId, to: NodeId, tag: u32) -> Result<()> {
        self.check_node(from)?;
        self.check_node(to)?;
        let out_head = self.head(from, Dir::Out);
        let in_head = self.head(to, Dir::In);
        // both halves fit or neither is written
        self.out_store.ensure_append_room(out_head, EDGE_UNITS)?;
        self.in_store.ensure_append_room(in_head, EDGE_UNITS)?;

        let out_head = self
            .out_store
            .append_list(out_head, &Edge::new(tag, to).encode())?;
        *self.head_mut(from, Dir::Out) = out_head;

        let in_head = self
            .in_store
            .append_list(in_head, &Edge::new(tag, from).encode())?;
        *self.head_mut(to, Dir::In) = in_head;

        self.edge_count += 1;
        self.metrics.edge_added();
        trace!(from = from.0, to = to.0, tag, "graph.add_edge");
        Ok(())
    }

    // ---- queries ----

    /// Pointer state of `id` in direction `dir`.
    pub fn adj_state(&self, id: NodeId, dir: Dir) -> Result<AdjState<W::Offset>> {
        self.check_node(id)?;
        let head = self.head(id, dir);
        Ok(if head == W::Offset::default() {
            AdjState::Unset
        } else {
            AdjState::Bound(head)
        })
    }

    /// Number of edges of `id` in direction `dir`.
    pub fn degree(&self, id: NodeId, dir: Dir) -> Result<u32> {
        self.check_node(id)?;
        self.metrics.degree_query(dir.as_str());
        Ok(self.chunk_store(dir).list_size(self.head(id, dir)))
    }

    /// Number of out-edges of `id`.
    pub fn out_degree(&self, id: NodeId) -> Result<u32> {
        self.degree(id, Dir::Out)
    }

    /// Number of in-edges of `id`.
    pub fn in_degree(&self, id: NodeId) -> Result<u32> {
        self.degree(id, Dir::In)
    }

    /// The `k`-th edge of `id` in direction `dir`.
    pub fn edge(&self, id: NodeId, dir: Dir, k: u32) -> Result<Edge> {
        self.check_node(id)?;
        let raw = self.chunk_store(dir).get_list_element(self.head(id, dir), k)?;
        Edge::decode(raw)
    }

    /// The `k`-th out-edge of `id`.
    pub fn out_edge(&self, id: NodeId, k: u32) -> Result<Edge> {
        self.edge(id, Dir::Out, k)
    }

    /// The `k`-th in-edge of `id`.
    pub fn in_edge(&self, id: NodeId, k: u32) -> Result<Edge> {
        self.edge(id, Dir::In, k)
    }

    /// Whether `id` has an edge to (out) or from (in) `neighbor`, whatever its tag.
    pub fn has_edge(&self, id: NodeId, neighbor: NodeId, dir: Dir) -> Result<bool> {
        Ok(self.edges(id, dir)?.any(|edge| edge.neighbor == neighbor))
    }

    /// Iterates the edges of `id` in direction `dir` in stored order.
    pub fn edges(&self, id: NodeId, dir: Dir) -> Result<EdgeCursor<'_, W>> {
        self.check_node(id)?;
        self.metrics.adjacency_scan(dir.as_str());
        Ok(EdgeCursor {
            inner: self.chunk_store(dir).list_iter(self.head(id, dir)),
        })
    }

    // ---- internals ----

    fn check_node(&self, id: NodeId) -> Result<()> {
        if self.nodes.contains(id) {
            Ok(())
        } else {
            Err(StoreError::UnknownNode(id))
        }
    }

    fn head(&self, id: NodeId, dir: Dir) -> W::Offset {
        match dir {
            Dir::Out => self.out_heads[id.index()],
            Dir::In => self.in_heads[id.index()],
        }
    }

    fn head_mut(&mut self, id: NodeId, dir: Dir) -> &mut W::Offset {
        match dir {
            Dir::Out => &mut self.out_heads[id.index()],
            Dir::In => &mut self.in_heads[id.index()],
        }
    }
}

/// Decoded iteration over one adjacency list, see [`GraphStore::edges`].
pub struct EdgeCursor<'a, W: OffsetWidth> {
    inner: ListIter<'a, W>,
}

impl<W: OffsetWidth> Iterator for EdgeCursor<'_, W> {
    type Item = Edge;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Edge::decode_unchecked)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
