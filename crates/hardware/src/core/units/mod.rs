//! Hardware units.
//!
//! This module contains the generic set-associative table shared by every
//! prefetcher structure and the prefetcher implementations built on it.

/// Timely-delta prefetcher and its redundant request filter.
pub mod prefetch;

/// Bounded set-associative table with replacement policies.
pub mod table;
