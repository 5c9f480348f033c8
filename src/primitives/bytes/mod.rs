#![forbid(unsafe_code)]
//! Fixed-width integer encoding over 16-bit code units.
//!
//! Every store in the crate keeps its data as a flat run of `u16` code units.
//! Integers wider than one unit are split high unit first; this convention is
//! part of the durable buffer layout and must not change.

pub mod units {
    //! Packs `u32`/`u64` values into 2 or 4 code units and back.

    /// Code units occupied by an encoded `u32`.
    pub const U32_UNITS: usize = 2;
    /// Code units occupied by an encoded `u64`.
    pub const U64_UNITS: usize = 4;

    /// Writes `v` into the first two units of `dst`, high unit first.
    #[inline]
    pub fn put_u32(dst: &mut [u16], v: u32) {
        assert!(dst.len() >= U32_UNITS, "destination too small");
        dst[0] = (v >> 16) as u16;
        dst[1] = v as u16;
    }

    /// Reads a `u32` from the first two units of `src`.
    #[inline]
    pub fn get_u32(src: &[u16]) -> u32 {
        let head = src
            .get(..U32_UNITS)
            .unwrap_or_else(|| panic!("u32 source shorter than 2 units (have {})", src.len()));
        (u32::from(head[0]) << 16) | u32::from(head[1])
    }

    /// Writes `v` into the first four units of `dst`, high unit first.
    #[inline]
    pub fn put_u64(dst: &mut [u16], v: u64) {
        assert!(dst.len() >= U64_UNITS, "destination too small");
        put_u32(&mut dst[..U32_UNITS], (v >> 32) as u32);
        put_u32(&mut dst[U32_UNITS..U64_UNITS], v as u32);
    }

    /// Reads a `u64` from the first four units of `src`.
    #[inline]
    pub fn get_u64(src: &[u16]) -> u64 {
        let head = src
            .get(..U64_UNITS)
            .unwrap_or_else(|| panic!("u64 source shorter than 4 units (have {})", src.len()));
        (u64::from(get_u32(&head[..U32_UNITS])) << 32) | u64::from(get_u32(&head[U32_UNITS..]))
    }

    /// Returns the two-unit encoding of `v`.
    pub fn pack_u32(v: u32) -> [u16; U32_UNITS] {
        let mut out = [0u16; U32_UNITS];
        put_u32(&mut out, v);
        out
    }

    /// Inverse of [`pack_u32`].
    pub fn unpack_u32(units: [u16; U32_UNITS]) -> u32 {
        get_u32(&units)
    }

    /// Returns the four-unit encoding of `v`.
    pub fn pack_u64(v: u64) -> [u16; U64_UNITS] {
        let mut out = [0u16; U64_UNITS];
        put_u64(&mut out, v);
        out
    }

    /// Inverse of [`pack_u64`].
    pub fn unpack_u64(units: [u16; U64_UNITS]) -> u64 {
        get_u64(&units)
    }

    /// Appends the two-unit encoding of `v` to `out`.
    pub fn extend_u32(out: &mut Vec<u16>, v: u32) {
        out.extend_from_slice(&pack_u32(v));
    }
}
