#![forbid(unsafe_code)]
//! Serializable images of chunk stores and graph stores.
//!
//! An image is the raw buffer plus the side tables needed to rebuild an
//! identical store. How it reaches disk is up to the embedding code; any
//! serde format works. Loading verifies the link width, the write cursor,
//! the preamble and a CRC32 over the buffer's little-endian bytes. Graph
//! images additionally have every list head walked once: each must start a
//! well-formed edge list owned by a single node, and the out-list sizes must
//! add up to the recorded edge count.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::primitives::bytes::units;
use crate::storage::catalog::NodeTable;
use crate::storage::chunk::{
    natural_limit, ChunkStore, OffsetWidth, LEN_UNITS, PREAMBLE_UNITS, SIZE_UNITS,
};
use crate::storage::graph::GraphStore;
use crate::storage::metrics::default_metrics;
use crate::storage::types::{Dir, EDGE_UNITS};

/// Image of one [`ChunkStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkImage {
    /// Link width in code units (2 narrow, 4 wide).
    pub link_units: u32,
    /// Write cursor limit the store was configured with.
    pub limit: u64,
    /// Next free offset; must equal `units.len()`.
    pub write_cursor: u64,
    /// The whole buffer, preamble included.
    pub units: Vec<u16>,
    /// CRC32 of `units` as little-endian bytes.
    pub crc32: u32,
}

/// Image of one [`GraphStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphImage {
    /// Out-edge chunk store.
    pub out: ChunkImage,
    /// In-edge chunk store.
    pub inbound: ChunkImage,
    /// Node keys ordered by id.
    pub keys: Vec<String>,
    /// Out-list head per id, 0 when unset.
    pub out_heads: Vec<u64>,
    /// In-list head per id, 0 when unset.
    pub in_heads: Vec<u64>,
    /// Number of edges stored in out-lists.
    pub edge_count: u64,
}

fn checksum(buf: &[u16]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for unit in buf {
        hasher.update(&unit.to_le_bytes());
    }
    hasher.finalize()
}

impl<W: OffsetWidth> ChunkStore<W> {
    /// Captures the store as an image.
    pub fn to_image(&self) -> ChunkImage {
        ChunkImage {
            link_units: W::LINK_UNITS as u32,
            limit: self.limit(),
            write_cursor: self.write_cursor(),
            units: self.units().to_vec(),
            crc32: checksum(self.units()),
        }
    }

    /// Rebuilds a store from an image, checking it first.
    pub fn from_image(image: ChunkImage) -> Result<Self> {
        if image.link_units as usize != W::LINK_UNITS {
            return Err(StoreError::corrupt(format!(
                "image has {}-unit links, {} store expects {}",
                image.link_units,
                W::NAME,
                W::LINK_UNITS
            )));
        }
        if image.write_cursor != image.units.len() as u64 {
            return Err(StoreError::corrupt(format!(
                "image cursor {} does not match buffer length {}",
                image.write_cursor,
                image.units.len()
            )));
        }
        if image.units.len() < PREAMBLE_UNITS
            || units::get_u32(&image.units) as usize != W::LINK_UNITS
        {
            return Err(StoreError::corrupt("image preamble missing or wrong"));
        }
        if image.limit > natural_limit::<W>() || image.write_cursor > image.limit {
            return Err(StoreError::corrupt(format!(
                "image limit {} invalid for {} store with cursor {}",
                image.limit,
                W::NAME,
                image.write_cursor
            )));
        }
        let actual = checksum(&image.units);
        if actual != image.crc32 {
            return Err(StoreError::corrupt(format!(
                "image checksum mismatch: stored {:#010x}, computed {actual:#010x}",
                image.crc32
            )));
        }
        debug!(store = W::NAME, cursor = image.write_cursor, "snapshot.chunk_loaded");
        Ok(Self::from_parts(image.units, image.limit))
    }
}

impl<W: OffsetWidth> Serialize for ChunkStore<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_image().serialize(serializer)
    }
}

impl<'de, W: OffsetWidth> Deserialize<'de> for ChunkStore<W> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let image = ChunkImage::deserialize(deserializer)?;
        Self::from_image(image).map_err(serde::de::Error::custom)
    }
}

/// Checks the block at `pos` lies inside `buf` and declares `body` units.
fn check_block(buf: &[u16], pos: usize, body: usize) -> std::result::Result<(), String> {
    if pos < PREAMBLE_UNITS || pos.saturating_add(LEN_UNITS + body) > buf.len() {
        return Err(format!("block at {pos} runs outside the buffer"));
    }
    let len = units::get_u32(&buf[pos..]) as usize;
    if len != body {
        return Err(format!("block at {pos} declares {len} units, expected {body}"));
    }
    Ok(())
}

/// Walks the edge list at `head` once and returns its size.
fn edge_list_size<W: OffsetWidth>(buf: &[u16], head: usize) -> std::result::Result<u32, String> {
    check_block(buf, head, SIZE_UNITS + W::LINK_UNITS + EDGE_UNITS)?;
    let size = units::get_u32(&buf[head + LEN_UNITS..]);
    if size < 1 {
        return Err(format!("list size {size}"));
    }
    let min_units = u64::from(size) * (LEN_UNITS + W::LINK_UNITS + EDGE_UNITS) as u64;
    if min_units > buf.len() as u64 {
        return Err(format!("list size {size} cannot fit in {} units", buf.len()));
    }
    let mut next = W::get_link(&buf[head + LEN_UNITS + SIZE_UNITS..]);
    for hop in 1..size {
        if next == 0 {
            return Err(format!("chain ends after {hop} of {size} blocks"));
        }
        let pos = usize::try_from(next).map_err(|_| format!("link {next} out of range"))?;
        check_block(buf, pos, W::LINK_UNITS + EDGE_UNITS)?;
        next = W::get_link(&buf[pos + LEN_UNITS..]);
    }
    if next != 0 {
        return Err(format!("chain continues past its {size} blocks"));
    }
    Ok(size)
}

/// Converts raw heads and verifies the list behind each one. Returns the
/// heads and the total number of entries across their lists.
fn load_heads<W: OffsetWidth>(
    raw: Vec<u64>,
    store: &ChunkStore<W>,
    dir: Dir,
) -> Result<(Vec<W::Offset>, u64)> {
    let mut seen = HashSet::new();
    let mut entries = 0u64;
    let mut heads = Vec::with_capacity(raw.len());
    for (id, head) in raw.into_iter().enumerate() {
        let bad = |why: String| {
            StoreError::corrupt(format!("{} head {head} of node {id}: {why}", dir.as_str()))
        };
        let offset = W::Offset::try_from(head)
            .map_err(|_| bad(format!("does not fit a {} offset", W::NAME)))?;
        if head != 0 {
            if !seen.insert(head) {
                return Err(bad("shared with another node".into()));
            }
            let pos = usize::try_from(head).map_err(|_| bad("out of range".into()))?;
            entries += u64::from(edge_list_size::<W>(store.units(), pos).map_err(bad)?);
        }
        heads.push(offset);
    }
    Ok((heads, entries))
}

impl<W: OffsetWidth> GraphStore<W> {
    /// Captures the store and its side tables as an image.
    pub fn to_image(&self) -> GraphImage {
        GraphImage {
            out: self.out_store.to_image(),
            inbound: self.in_store.to_image(),
            keys: self.nodes.keys_by_id(),
            out_heads: self.out_heads.iter().map(|h| (*h).into()).collect(),
            in_heads: self.in_heads.iter().map(|h| (*h).into()).collect(),
            edge_count: self.edge_count,
        }
    }

    /// Rebuilds a store from an image. Handles and query results are
    /// identical to those of the store the image was taken from.
    pub fn from_image(image: GraphImage) -> Result<Self> {
        let nodes = NodeTable::from_keys(image.keys)?;
        if image.out_heads.len() != nodes.len() || image.in_heads.len() != nodes.len() {
            return Err(StoreError::corrupt(format!(
                "{} nodes but {} out heads and {} in heads",
                nodes.len(),
                image.out_heads.len(),
                image.in_heads.len()
            )));
        }
        let out_store = ChunkStore::from_image(image.out)?;
        let in_store = ChunkStore::from_image(image.inbound)?;
        let (out_heads, out_entries) = load_heads(image.out_heads, &out_store, Dir::Out)?;
        let (in_heads, _) = load_heads(image.in_heads, &in_store, Dir::In)?;
        if out_entries != image.edge_count {
            return Err(StoreError::corrupt(format!(
                "image records {} edges but its out-lists hold {out_entries}",
                image.edge_count
            )));
        }
        debug!(
            store = W::NAME,
            nodes = nodes.len(),
            edges = image.edge_count,
            "snapshot.graph_loaded"
        );
        Ok(Self {
            nodes,
            out_store,
            in_store,
            out_heads,
            in_heads,
            edge_count: image.edge_count,
            metrics: default_metrics(),
        })
    }
}

impl<W: OffsetWidth> Serialize for GraphStore<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_image().serialize(serializer)
    }
}

impl<'de, W: OffsetWidth> Deserialize<'de> for GraphStore<W> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let image = GraphImage::deserialize(deserializer)?;
        Self::from_image(image).map_err(serde::de::Error::custom)
    }
}
