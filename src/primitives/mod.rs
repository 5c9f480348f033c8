//! Low-level primitives shared by the storage layers.

/// Integer packing over 16-bit code units.
pub mod bytes;
