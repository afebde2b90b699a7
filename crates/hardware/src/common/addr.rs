//! Line address and cycle types.
//!
//! The prefetcher reasons about memory in units of cache lines. This module defines:
//! 1. **Type Safety:** `LineAddr` keeps line indices apart from raw byte addresses.
//! 2. **Delta Arithmetic:** Signed line distances between two line indices, and
//!    applying such a distance to produce a prefetch target.
//! 3. **Time:** The `Cycle` alias used for every timestamp the engine stores.

use std::fmt;

/// A point in simulated time, in core clock cycles.
pub type Cycle = u64;

/// A cache-line index (byte address shifted right by the block shift).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineAddr(pub u64);

impl LineAddr {
    /// Converts a byte address into its line index.
    ///
    /// # Arguments
    ///
    /// * `addr` - The byte address.
    /// * `block_shift` - log2 of the cache line size in bytes.
    #[inline(always)]
    pub const fn from_byte(addr: u64, block_shift: u32) -> Self {
        Self(addr >> block_shift)
    }

    /// Returns the byte address of the first byte of this line.
    #[inline(always)]
    pub const fn to_byte(self, block_shift: u32) -> u64 {
        self.0 << block_shift
    }

    /// Returns the raw line index.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Signed distance in lines from `base` to `self`.
    #[inline]
    pub const fn delta_from(self, base: Self) -> i64 {
        self.0.wrapping_sub(base.0) as i64
    }

    /// Applies a signed line distance, wrapping at the address-space edge.
    #[inline]
    pub const fn offset(self, delta: i64) -> Self {
        Self(self.0.wrapping_add_signed(delta))
    }
}

impl fmt::Display for LineAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
