use std::fmt;
use std::hash::Hash;

use crate::primitives::bytes::units;

/// Addressing scheme of a [`super::ChunkStore`].
///
/// The width fixes the handle type, the number of code units a link field
/// occupies inside list blocks, and the largest write cursor the store accepts.
/// Everything else about the record layout is shared.
pub trait OffsetWidth: Copy + Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Handle type returned to callers. Zero is reserved as "no record".
    type Offset: Copy
        + Eq
        + Ord
        + Hash
        + Default
        + fmt::Debug
        + fmt::Display
        + Into<u64>
        + TryFrom<u64>
        + Send
        + Sync
        + 'static;

    /// Code units used by a `nextLink` field.
    const LINK_UNITS: usize;
    /// Largest write cursor (in code units) this width can address.
    const MAX_UNITS: u64;
    /// Short label used in logs and errors.
    const NAME: &'static str;

    /// Writes a link into the first [`Self::LINK_UNITS`] units of `dst`.
    fn put_link(dst: &mut [u16], link: u64);

    /// Reads a link from the first [`Self::LINK_UNITS`] units of `src`.
    fn get_link(src: &[u16]) -> u64;
}

/// 32-bit addressing with 2-unit links.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Narrow;

/// 64-bit addressing with 4-unit links, for buffers past the 32-bit range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Wide;

impl OffsetWidth for Narrow {
    type Offset = u32;

    const LINK_UNITS: usize = units::U32_UNITS;
    const MAX_UNITS: u64 = u32::MAX as u64;
    const NAME: &'static str = "narrow";

    #[inline]
    fn put_link(dst: &mut [u16], link: u64) {
        debug_assert!(link <= Self::MAX_UNITS, "narrow link out of range");
        units::put_u32(dst, link as u32);
    }

    #[inline]
    fn get_link(src: &[u16]) -> u64 {
        u64::from(units::get_u32(src))
    }
}

impl OffsetWidth for Wide {
    type Offset = u64;

    const LINK_UNITS: usize = units::U64_UNITS;
    const MAX_UNITS: u64 = u64::MAX;
    const NAME: &'static str = "wide";

    #[inline]
    fn put_link(dst: &mut [u16], link: u64) {
        units::put_u64(dst, link);
    }

    #[inline]
    fn get_link(src: &[u16]) -> u64 {
        units::get_u64(src)
    }
}
