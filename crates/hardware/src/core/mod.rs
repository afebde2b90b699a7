//! Prefetcher core.
//!
//! This module contains the hardware structures the prefetcher is built from:
//! the bounded set-associative table with its replacement policies, and the
//! prefetch unit that drives training and issue.

/// Hardware units (associative tables, prefetchers).
pub mod units;
