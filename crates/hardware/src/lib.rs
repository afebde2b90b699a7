//! Berti timely-delta prefetcher library.
//!
//! This crate implements a per-PC delta prefetcher that learns only the deltas
//! that would have hidden the observed miss latency, with the following:
//! 1. **Training:** Per-PC access history stamped with the cycle of each access.
//! 2. **Learning:** Timely delta search driven by measured fill latency.
//! 3. **Confidence:** Coverage-based promotion of deltas to L1 or L2 prefetch.
//! 4. **Issue:** Conservative (best delta) or aggressive (all promoted deltas)
//!    issue through a redundant prefetch filter.
//! 5. **Support:** Configuration, statistics, and a generic associative table.
//!
//! The engine is single-threaded and event driven: the caller reports demand
//! accesses and fill completions and receives prefetch requests back.

/// Common types and constants (line addresses, cycles, errors).
pub mod common;
/// Prefetcher configuration (defaults, enums, table shapes, confidence policy).
pub mod config;
/// Prefetcher hardware (associative table, replacement policies, Berti engine).
pub mod core;
/// Prefetcher statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The timely-delta prefetcher; construct with `BertiPrefetcher::new`.
pub use crate::core::units::prefetch::BertiPrefetcher;
/// Event and request types exchanged with the cache.
pub use crate::core::units::prefetch::{
    AccessInfo, FillInfo, PrefetchRequest, PrefetchSource, Prefetcher,
};
