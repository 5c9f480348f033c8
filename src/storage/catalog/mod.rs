#![forbid(unsafe_code)]

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::storage::types::NodeId;

/// Node count cap. Keeps the count itself representable as a `u32`.
pub(crate) const MAX_NODES: u64 = u32::MAX as u64;

/// Bidirectionally consistent key to id mapping.
///
/// Ids are handed out as 0, 1, 2, ... in first-seen order and never reused.
/// Keys are kept in a `BTreeMap` so enumeration is ordered by key.
#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    ids: BTreeMap<String, NodeId>,
    next_id: u64,
}

impl NodeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `key`, allocating the next one if the key is new.
    ///
    /// The flag is `true` when a new id was allocated.
    pub fn intern(&mut self, key: &str) -> Result<(NodeId, bool)> {
        if let Some(id) = self.ids.get(key) {
            return Ok((*id, false));
        }
        if self.next_id >= MAX_NODES {
            warn!(key, "catalog.node_ids_exhausted");
            return Err(StoreError::CapacityExceeded {
                store: "node table",
                requested: self.next_id + 1,
                limit: MAX_NODES,
            });
        }
        let id = NodeId(self.next_id as u32);
        self.ids.insert(key.to_owned(), id);
        self.next_id += 1;
        debug!(key, id = id.0, "catalog.intern");
        Ok((id, true))
    }

    /// Looks up `key` without allocating.
    pub fn lookup(&self, key: &str) -> Option<NodeId> {
        self.ids.get(key).copied()
    }

    /// Number of ids handed out.
    pub fn len(&self) -> usize {
        self.next_id as usize
    }

    /// True when no key has been interned.
    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }

    /// True when `id` was handed out by this table.
    pub fn contains(&self, id: NodeId) -> bool {
        u64::from(id.0) < self.next_id
    }

    /// Iterates `(key, id)` pairs ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.ids.iter().map(|(key, id)| (key.as_str(), *id))
    }

    /// Keys ordered by id, i.e. `keys_by_id()[id]` is the key of `id`.
    pub fn keys_by_id(&self) -> Vec<String> {
        let mut keys = vec![String::new(); self.len()];
        for (key, id) in &self.ids {
            keys[id.index()] = key.clone();
        }
        keys
    }

    /// Rebuilds a table from keys ordered by id.
    pub fn from_keys(keys: Vec<String>) -> Result<Self> {
        if keys.len() as u64 > MAX_NODES {
            return Err(StoreError::corrupt(format!(
                "{} node keys exceed the id space",
                keys.len()
            )));
        }
        let mut ids = BTreeMap::new();
        for (index, key) in keys.into_iter().enumerate() {
            match ids.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(NodeId(index as u32));
                }
                Entry::Occupied(slot) => {
                    return Err(StoreError::corrupt(format!(
                        "node key {:?} appears twice",
                        slot.key()
                    )));
                }
            }
        }
        let next_id = ids.len() as u64;
        Ok(Self { ids, next_id })
    }
}
