#![forbid(unsafe_code)]
//! Append-only chunk store over a flat buffer of 16-bit code units.
//!
//! Three record kinds share one buffer:
//!
//! * variable-length: `[len:2][payload]`
//! * fixed-length: `[payload]`, the caller remembers the length
//! * list: a chain of blocks linked by offsets. The first block is
//!   `[len:2][size:2][next:L][payload]`, every further block is
//!   `[len:2][next:L][payload]`. `len` counts everything after itself and
//!   `next == 0` terminates the chain.
//!
//! `L` is the link width of the [`OffsetWidth`] the store is instantiated
//! with. Offset 0 holds a two-unit preamble recording `L`, so no record ever
//! starts at 0 and a zero handle or link always means "none".
//!
//! Handles are trusted. Passing a handle that was not returned by an `add_*`
//! call on the same store yields garbage or panics on a slice bound; the store
//! never validates handle provenance.

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::error::{Result, StoreError};
use crate::primitives::bytes::units;

mod width;

pub use width::{Narrow, OffsetWidth, Wide};

/// Code units of a record length header.
pub const LEN_UNITS: usize = units::U32_UNITS;
/// Code units of the list size field in a first block.
pub const SIZE_UNITS: usize = units::U32_UNITS;
/// Code units reserved at offset 0.
pub const PREAMBLE_UNITS: usize = units::U32_UNITS;

const MAX_FIELD: u64 = u32::MAX as u64;

/// Chunk store addressed by 32-bit offsets.
pub type NarrowChunkStore = ChunkStore<Narrow>;
/// Chunk store addressed by 64-bit offsets.
pub type WideChunkStore = ChunkStore<Wide>;

/// Sizing options for a [`ChunkStore`].
#[derive(Clone, Debug, Default)]
pub struct ChunkStoreOptions {
    /// Code units to preallocate.
    pub capacity_hint: usize,
    /// Optional cap on the write cursor, below the width's natural limit.
    pub max_units: Option<u64>,
}

impl ChunkStoreOptions {
    /// Creates options with no preallocation and the natural limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of code units to preallocate.
    pub fn capacity_hint(mut self, units: usize) -> Self {
        self.capacity_hint = units;
        self
    }

    /// Caps the write cursor at `units`.
    pub fn max_units(mut self, units: u64) -> Self {
        self.max_units = Some(units);
        self
    }
}

/// Append-only record store generic over its addressing width.
#[derive(Clone)]
pub struct ChunkStore<W: OffsetWidth> {
    units: Vec<u16>,
    limit: u64,
    _width: PhantomData<W>,
}

impl<W: OffsetWidth> Default for ChunkStore<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: OffsetWidth> fmt::Debug for ChunkStore<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStore")
            .field("width", &W::NAME)
            .field("write_cursor", &self.units.len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl<W: OffsetWidth> ChunkStore<W> {
    /// Creates an empty store with the width's natural limit.
    pub fn new() -> Self {
        Self::fresh(0, natural_limit::<W>())
    }

    /// Creates an empty store using `opts`.
    pub fn with_options(opts: ChunkStoreOptions) -> Result<Self> {
        let limit = natural_limit::<W>().min(opts.max_units.unwrap_or(u64::MAX));
        if limit < PREAMBLE_UNITS as u64 {
            return Err(StoreError::Config(format!(
                "max_units {limit} leaves no room for the {PREAMBLE_UNITS}-unit preamble"
            )));
        }
        Ok(Self::fresh(opts.capacity_hint, limit))
    }

    fn fresh(capacity_hint: usize, limit: u64) -> Self {
        let mut buf = Vec::with_capacity(capacity_hint.max(PREAMBLE_UNITS));
        units::extend_u32(&mut buf, W::LINK_UNITS as u32);
        Self {
            units: buf,
            limit,
            _width: PhantomData,
        }
    }

    pub(crate) fn from_parts(units: Vec<u16>, limit: u64) -> Self {
        Self {
            units,
            limit,
            _width: PhantomData,
        }
    }

    /// Next free offset. Only ever grows.
    pub fn write_cursor(&self) -> u64 {
        self.units.len() as u64
    }

    /// Largest write cursor this store accepts.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// True when nothing but the preamble has been written.
    pub fn is_empty(&self) -> bool {
        self.units.len() <= PREAMBLE_UNITS
    }

    /// Read-only view of the whole buffer, preamble included.
    pub fn units(&self) -> &[u16] {
        &self.units
    }

    // ---- variable-length records ----

    /// Appends `[len][payload]` and returns the offset of the length header.
    pub fn add_variable(&mut self, payload: &[u16]) -> Result<W::Offset> {
        let len = field_len::<W>(payload.len())?;
        let start = self.ensure_room(LEN_UNITS + payload.len())?;
        let handle = offset_at::<W>(start)?;
        units::extend_u32(&mut self.units, len);
        self.units.extend_from_slice(payload);
        trace!(store = W::NAME, handle = start, len, "chunk.add_variable");
        Ok(handle)
    }

    /// Returns the payload of the variable-length record at `handle`.
    pub fn get_variable(&self, handle: W::Offset) -> &[u16] {
        let pos = pos_of::<W>(handle);
        let len = units::get_u32(&self.units[pos..]) as usize;
        let start = pos + LEN_UNITS;
        &self.units[start..start + len]
    }

    // ---- fixed-length records ----

    /// Appends `payload` without a header.
    pub fn add_fixed(&mut self, payload: &[u16]) -> Result<W::Offset> {
        let start = self.ensure_room(payload.len())?;
        let handle = offset_at::<W>(start)?;
        self.units.extend_from_slice(payload);
        trace!(store = W::NAME, handle = start, len = payload.len(), "chunk.add_fixed");
        Ok(handle)
    }

    /// Reads `len` units starting at `handle`.
    ///
    /// `len` must equal the length the record was written with.
    pub fn get_fixed(&self, handle: W::Offset, len: usize) -> &[u16] {
        let pos = pos_of::<W>(handle);
        &self.units[pos..pos + len]
    }

    /// Overwrites the fixed-length record at `handle` in place.
    ///
    /// `payload` must be exactly as long as the original record; a shorter or
    /// longer payload silently corrupts this or the following records.
    pub fn replace_fixed(&mut self, handle: W::Offset, payload: &[u16]) {
        let pos = pos_of::<W>(handle);
        debug_assert!(pos >= PREAMBLE_UNITS, "fixed record overlaps the preamble");
        self.units[pos..pos + payload.len()].copy_from_slice(payload);
        trace!(store = W::NAME, handle = pos, len = payload.len(), "chunk.replace_fixed");
    }

    // ---- lists ----

    /// Creates a one-element list and returns the offset of its first block.
    pub fn add_list(&mut self, payload: &[u16]) -> Result<W::Offset> {
        let block_len = field_len::<W>(SIZE_UNITS + W::LINK_UNITS + payload.len())?;
        let start = self.ensure_room(LEN_UNITS + block_len as usize)?;
        let handle = offset_at::<W>(start)?;
        units::extend_u32(&mut self.units, block_len);
        units::extend_u32(&mut self.units, 1);
        self.push_link(0);
        self.units.extend_from_slice(payload);
        debug!(store = W::NAME, handle = start, len = payload.len(), "chunk.add_list");
        Ok(handle)
    }

    /// Appends `payload` at the tail of the list at `handle`.
    ///
    /// A zero handle creates a new list instead, so callers can keep one
    /// pointer field per list whether or not the list exists yet. Returns the
    /// head handle, which never changes once the list exists.
    pub fn append_list(&mut self, handle: W::Offset, payload: &[u16]) -> Result<W::Offset> {
        let head = pos_of::<W>(handle);
        if head == 0 {
            return self.add_list(payload);
        }
        let size = self.stored_size(head);
        if size < 1 {
            return Err(StoreError::corrupt(format!(
                "appending to {} list at {head} whose size is {size}",
                W::NAME
            )));
        }
        let new_size = size.checked_add(1).ok_or_else(|| {
            warn!(store = W::NAME, handle = head, size, "chunk.list_size_overflow");
            StoreError::CapacityExceeded {
                store: W::NAME,
                requested: u64::from(size) + 1,
                limit: MAX_FIELD,
            }
        })?;
        let tail_link = self.tail_link_pos(head, size)?;
        let start = self.push_block(payload)?;
        W::put_link(&mut self.units[tail_link..], start as u64);
        units::put_u32(&mut self.units[head + LEN_UNITS..], new_size);
        trace!(
            store = W::NAME,
            handle = head,
            block = start,
            size = new_size,
            "chunk.append_list"
        );
        Ok(handle)
    }

    /// Checks that [`Self::append_list`] of a `payload_len`-unit payload onto
    /// `handle` fits under the limit, without writing anything.
    ///
    /// Lets callers that update several lists for one logical write fail
    /// before the first list is touched.
    pub fn ensure_append_room(&self, handle: W::Offset, payload_len: usize) -> Result<()> {
        let header = if pos_of::<W>(handle) == 0 {
            LEN_UNITS + SIZE_UNITS + W::LINK_UNITS
        } else {
            LEN_UNITS + W::LINK_UNITS
        };
        self.ensure_room(header + payload_len).map(|_| ())
    }

    /// Writes a whole list in one pass and returns its head, or `None` when
    /// `payloads` is empty.
    ///
    /// The resulting layout is identical to one `add_list` followed by
    /// `append_list` for every further payload, without re-walking the chain
    /// on each append. On error the buffer is rolled back to where it was.
    pub fn add_list_from<'p, I>(&mut self, payloads: I) -> Result<Option<W::Offset>>
    where
        I: IntoIterator<Item = &'p [u16]>,
    {
        let mut iter = payloads.into_iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        let mark = self.units.len();
        let handle = self.add_list(first)?;
        let mut tail_link = Self::link_pos(mark, true);
        let mut size = 1u32;
        for payload in iter {
            let block = match size.checked_add(1) {
                Some(next) => self.push_block(payload).map(|block| (block, next)),
                None => Err(StoreError::CapacityExceeded {
                    store: W::NAME,
                    requested: u64::from(size) + 1,
                    limit: MAX_FIELD,
                }),
            };
            let (block, next) = match block {
                Ok(ok) => ok,
                Err(err) => {
                    self.units.truncate(mark);
                    return Err(err);
                }
            };
            W::put_link(&mut self.units[tail_link..], block as u64);
            tail_link = Self::link_pos(block, false);
            size = next;
        }
        units::put_u32(&mut self.units[mark + LEN_UNITS..], size);
        debug!(store = W::NAME, handle = mark, size, "chunk.add_list_from");
        Ok(Some(handle))
    }

    /// Number of elements in the list at `handle`; 0 for a zero handle.
    pub fn list_size(&self, handle: W::Offset) -> u32 {
        match pos_of::<W>(handle) {
            0 => 0,
            head => self.stored_size(head),
        }
    }

    /// Returns element `index` of the list at `handle`.
    ///
    /// Walks `index` links from the head, so the cost is linear in `index`.
    pub fn get_list_element(&self, handle: W::Offset, index: u32) -> Result<&[u16]> {
        let head = pos_of::<W>(handle);
        let size = self.list_size(handle);
        if head != 0 && size < 1 {
            return Err(StoreError::corrupt(format!(
                "reading {} list at {head} whose size is {size}",
                W::NAME
            )));
        }
        if index >= size {
            return Err(StoreError::IndexOutOfRange {
                index: u64::from(index),
                len: u64::from(size),
            });
        }
        if index == 0 {
            return Ok(self.block_payload(head, true));
        }
        let mut block = self.next_of(head, true);
        for _ in 1..index {
            if block == 0 {
                break;
            }
            block = self.next_of(block, false);
        }
        if block == 0 {
            return Err(StoreError::corrupt(format!(
                "{} list at {head} records {size} elements but its chain is shorter",
                W::NAME
            )));
        }
        Ok(self.block_payload(block, false))
    }

    /// Index of the first element equal to `payload`, comparing length and content.
    pub fn find_list_element(&self, handle: W::Offset, payload: &[u16]) -> Option<u32> {
        self.list_iter(handle)
            .position(|element| element == payload)
            .map(|index| index as u32)
    }

    /// Iterates the elements of the list at `handle` in chain order.
    pub fn list_iter(&self, handle: W::Offset) -> ListIter<'_, W> {
        let block = pos_of::<W>(handle);
        ListIter {
            store: self,
            block,
            first: true,
            remaining: self.list_size(handle),
        }
    }

    // ---- internals ----

    fn ensure_room(&self, additional: usize) -> Result<usize> {
        let start = self.units.len();
        let end = (start as u64).saturating_add(additional as u64);
        if end > self.limit {
            warn!(
                store = W::NAME,
                cursor = start,
                additional,
                limit = self.limit,
                "chunk.capacity_exceeded"
            );
            return Err(StoreError::CapacityExceeded {
                store: W::NAME,
                requested: end,
                limit: self.limit,
            });
        }
        Ok(start)
    }

    /// Appends an unlinked continuation block and returns its offset.
    fn push_block(&mut self, payload: &[u16]) -> Result<usize> {
        let block_len = field_len::<W>(W::LINK_UNITS + payload.len())?;
        let start = self.ensure_room(LEN_UNITS + block_len as usize)?;
        units::extend_u32(&mut self.units, block_len);
        self.push_link(0);
        self.units.extend_from_slice(payload);
        Ok(start)
    }

    fn push_link(&mut self, link: u64) {
        let at = self.units.len();
        self.units.resize(at + W::LINK_UNITS, 0);
        W::put_link(&mut self.units[at..], link);
    }

    fn stored_size(&self, head: usize) -> u32 {
        units::get_u32(&self.units[head + LEN_UNITS..])
    }

    fn link_pos(block: usize, first: bool) -> usize {
        if first {
            block + LEN_UNITS + SIZE_UNITS
        } else {
            block + LEN_UNITS
        }
    }

    fn next_of(&self, block: usize, first: bool) -> usize {
        W::get_link(&self.units[Self::link_pos(block, first)..]) as usize
    }

    fn tail_link_pos(&self, head: usize, size: u32) -> Result<usize> {
        let mut block = head;
        let mut first = true;
        for hop in 1..size {
            let next = self.next_of(block, first);
            if next == 0 {
                return Err(StoreError::corrupt(format!(
                    "{} list at {head} records {size} elements but its chain ends after {hop}",
                    W::NAME
                )));
            }
            block = next;
            first = false;
        }
        Ok(Self::link_pos(block, first))
    }

    fn block_payload(&self, block: usize, first: bool) -> &[u16] {
        let len = units::get_u32(&self.units[block..]) as usize;
        let start = Self::link_pos(block, first) + W::LINK_UNITS;
        let end = block + LEN_UNITS + len;
        &self.units[start..end]
    }
}

/// Iterator over the elements of one list, see [`ChunkStore::list_iter`].
pub struct ListIter<'a, W: OffsetWidth> {
    store: &'a ChunkStore<W>,
    block: usize,
    first: bool,
    remaining: u32,
}

impl<'a, W: OffsetWidth> Iterator for ListIter<'a, W> {
    type Item = &'a [u16];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.block == 0 {
            return None;
        }
        let payload = self.store.block_payload(self.block, self.first);
        self.block = self.store.next_of(self.block, self.first);
        self.first = false;
        self.remaining -= 1;
        Some(payload)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

pub(crate) fn natural_limit<W: OffsetWidth>() -> u64 {
    W::MAX_UNITS.min(usize::MAX as u64)
}

#[inline]
fn pos_of<W: OffsetWidth>(handle: W::Offset) -> usize {
    let raw: u64 = handle.into();
    raw as usize
}

fn offset_at<W: OffsetWidth>(pos: usize) -> Result<W::Offset> {
    W::Offset::try_from(pos as u64).map_err(|_| StoreError::CapacityExceeded {
        store: W::NAME,
        requested: pos as u64,
        limit: W::MAX_UNITS,
    })
}

fn field_len<W: OffsetWidth>(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        warn!(store = W::NAME, len, "chunk.record_too_long");
        StoreError::CapacityExceeded {
            store: W::NAME,
            requested: len as u64,
            limit: MAX_FIELD,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_store_reserves_offset_zero() {
        let narrow = NarrowChunkStore::new();
        assert_eq!(narrow.units(), &[0, 2]);
        assert!(narrow.is_empty());
        let wide = WideChunkStore::new();
        assert_eq!(wide.units(), &[0, 4]);
        assert_eq!(wide.write_cursor(), PREAMBLE_UNITS as u64);
    }

    #[test]
    fn variable_record_layout() {
        let mut store = NarrowChunkStore::new();
        let h = store.add_variable(&[7, 8, 9]).unwrap();
        assert_eq!(h, 2);
        assert_eq!(&store.units()[2..], &[0, 3, 7, 8, 9]);
        assert_eq!(store.get_variable(h), &[7, 8, 9]);
        let empty = store.add_variable(&[]).unwrap();
        assert_eq!(store.get_variable(empty), &[] as &[u16]);
    }

    #[test]
    fn narrow_list_layout() {
        let mut store = NarrowChunkStore::new();
        let h = store.add_list(&[0xA]).unwrap();
        assert_eq!(store.append_list(h, &[0xB, 0xC]).unwrap(), h);
        // first block: len=5, size=2, next=9, payload
        // second block: len=4, next=0, payload
        assert_eq!(
            &store.units()[2..],
            &[0, 5, 0, 2, 0, 9, 0xA, 0, 4, 0, 0, 0xB, 0xC]
        );
    }

    #[test]
    fn wide_list_layout_uses_four_unit_links() {
        let mut store = WideChunkStore::new();
        let h = store.add_list(&[0xA]).unwrap();
        store.append_list(h, &[0xB]).unwrap();
        assert_eq!(
            &store.units()[2..],
            &[0, 7, 0, 2, 0, 0, 0, 11, 0xA, 0, 5, 0, 0, 0, 0, 0xB]
        );
        assert_eq!(store.get_list_element(h, 1).unwrap(), &[0xB]);
    }

    #[test]
    fn zero_handle_append_creates_list() {
        let mut store = NarrowChunkStore::new();
        assert_eq!(store.list_size(0), 0);
        let h = store.append_list(0, &[1]).unwrap();
        assert_ne!(h, 0);
        assert_eq!(store.list_size(h), 1);
    }

    #[test]
    fn replace_fixed_touches_only_its_units() {
        let mut store = NarrowChunkStore::new();
        let a = store.add_fixed(&[1, 2, 3]).unwrap();
        let b = store.add_fixed(&[4, 5]).unwrap();
        store.replace_fixed(a, &[9, 9, 9]);
        assert_eq!(store.get_fixed(a, 3), &[9, 9, 9]);
        assert_eq!(store.get_fixed(b, 2), &[4, 5]);
        assert_eq!(store.write_cursor(), 7);
    }

    #[test]
    fn index_past_end_is_rejected() {
        let mut store = NarrowChunkStore::new();
        let h = store.add_list(&[1]).unwrap();
        store.append_list(h, &[2]).unwrap();
        match store.get_list_element(h, 2) {
            Err(StoreError::IndexOutOfRange { index: 2, len: 2 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            store.get_list_element(0, 0),
            Err(StoreError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn zero_size_list_is_corrupt() {
        let mut store = NarrowChunkStore::new();
        let h = store.add_list(&[1]).unwrap();
        let at = h as usize + LEN_UNITS;
        units::put_u32(&mut store.units[at..], 0);
        assert!(matches!(
            store.append_list(h, &[2]),
            Err(StoreError::CorruptState(_))
        ));
        assert!(matches!(
            store.get_list_element(h, 0),
            Err(StoreError::CorruptState(_))
        ));
    }

    #[test]
    fn size_larger_than_chain_is_corrupt() {
        let mut store = NarrowChunkStore::new();
        let h = store.add_list(&[1]).unwrap();
        let at = h as usize + LEN_UNITS;
        units::put_u32(&mut store.units[at..], 3);
        let cursor = store.write_cursor();
        assert!(matches!(
            store.append_list(h, &[2]),
            Err(StoreError::CorruptState(_))
        ));
        assert_eq!(store.write_cursor(), cursor, "failed append must not write");
        assert!(matches!(
            store.get_list_element(h, 2),
            Err(StoreError::CorruptState(_))
        ));
    }

    #[test]
    fn capacity_limit_is_enforced_before_writing() {
        let opts = ChunkStoreOptions::new().max_units(10);
        let mut store = NarrowChunkStore::with_options(opts).unwrap();
        let h = store.add_list(&[1, 2]).unwrap(); // 2 + 8 = 10
        assert_eq!(store.write_cursor(), 10);
        let err = store.append_list(h, &[3]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CapacityExceeded {
                store: "narrow",
                requested: 15,
                limit: 10
            }
        ));
        assert_eq!(store.list_size(h), 1);
        assert_eq!(store.write_cursor(), 10);
        assert!(store.add_fixed(&[]).is_ok());
        assert!(store.add_fixed(&[0]).is_err());
    }

    #[test]
    fn append_room_check_matches_append() {
        let opts = ChunkStoreOptions::new().max_units(20);
        let mut store = NarrowChunkStore::with_options(opts).unwrap();
        // new list: 2 len + 2 size + 2 link + 4 payload
        assert!(store.ensure_append_room(0, 4).is_ok());
        let h = store.append_list(0, &[1, 2, 3, 4]).unwrap();
        // continuation: 2 len + 2 link + 4 payload lands exactly on the limit
        assert!(store.ensure_append_room(h, 4).is_ok());
        assert!(store.ensure_append_room(h, 5).is_err());
        assert!(store.ensure_append_room(0, 4).is_err());
        assert_eq!(store.write_cursor(), 12);
        store.append_list(h, &[5, 6, 7, 8]).unwrap();
        assert_eq!(store.write_cursor(), 20);
    }

    #[test]
    fn options_without_room_for_preamble_are_rejected() {
        let opts = ChunkStoreOptions::new().max_units(1);
        assert!(matches!(
            WideChunkStore::with_options(opts),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn list_iter_matches_indexed_reads() {
        let mut store = WideChunkStore::new();
        let mut h = 0;
        for i in 0..20u16 {
            h = store.append_list(h, &vec![i; usize::from(i % 3)]).unwrap();
        }
        let walked: Vec<&[u16]> = store.list_iter(h).collect();
        assert_eq!(walked.len(), 20);
        for (i, element) in walked.iter().enumerate() {
            assert_eq!(*element, store.get_list_element(h, i as u32).unwrap());
        }
    }

    #[test]
    fn bulk_list_matches_repeated_appends() {
        let items: Vec<Vec<u16>> = (0..7u16).map(|i| vec![i, i * 2]).collect();
        let mut appended = WideChunkStore::new();
        let a = build_list(&mut appended, &items);
        let mut bulk = WideChunkStore::new();
        let b = bulk
            .add_list_from(items.iter().map(Vec::as_slice))
            .unwrap()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(appended.units(), bulk.units());
        assert_eq!(bulk.add_list_from(std::iter::empty()).unwrap(), None);
    }

    #[test]
    fn bulk_list_rolls_back_on_overflow() {
        let opts = ChunkStoreOptions::new().max_units(20);
        let mut store = NarrowChunkStore::with_options(opts).unwrap();
        let items = [vec![1u16], vec![2], vec![3], vec![4]];
        assert!(store.add_list_from(items.iter().map(Vec::as_slice)).is_err());
        assert!(store.is_empty());
    }

    fn build_list<W: OffsetWidth>(store: &mut ChunkStore<W>, items: &[Vec<u16>]) -> W::Offset {
        let mut handle = W::Offset::default();
        for item in items {
            handle = store.append_list(handle, item).unwrap();
        }
        handle
    }

    fn check_list<W: OffsetWidth>(items: &[Vec<u16>]) -> std::result::Result<(), TestCaseError> {
        let mut store = ChunkStore::<W>::new();
        let handle = build_list(&mut store, items);
        prop_assert_eq!(store.list_size(handle) as usize, items.len());
        for (k, item) in items.iter().enumerate() {
            prop_assert_eq!(store.get_list_element(handle, k as u32).unwrap(), item.as_slice());
            let found = store.find_list_element(handle, item).unwrap() as usize;
            prop_assert!(found <= k);
            prop_assert_eq!(&items[found], item);
        }
        Ok(())
    }

    fn payloads(
        max_len: usize,
        count: std::ops::Range<usize>,
    ) -> impl Strategy<Value = Vec<Vec<u16>>> {
        prop::collection::vec(prop::collection::vec(any::<u16>(), 0..max_len), count)
    }

    proptest! {
        #[test]
        fn variable_roundtrip_prop(items in payloads(16, 1..32)) {
            let mut store = NarrowChunkStore::new();
            let handles: Vec<u32> = items
                .iter()
                .map(|p| store.add_variable(p).unwrap())
                .collect();
            for (h, p) in handles.iter().zip(&items) {
                prop_assert_eq!(store.get_variable(*h), p.as_slice());
            }
        }

        #[test]
        fn narrow_list_prop(items in payloads(6, 1..40)) {
            check_list::<Narrow>(&items)?;
        }

        #[test]
        fn wide_list_prop(items in payloads(6, 1..40)) {
            check_list::<Wide>(&items)?;
        }

        #[test]
        fn absent_element_not_found_prop(
            items in prop::collection::vec(prop::collection::vec(0u16..100, 1..4), 1..20)
        ) {
            let mut store = NarrowChunkStore::new();
            let handle = build_list(&mut store, &items);
            prop_assert_eq!(store.find_list_element(handle, &[100, 100]), None);
        }
    }
}
