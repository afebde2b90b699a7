//! Engine-wide constants.
//!
//! Values that are fixed by the prefetcher design rather than exposed as
//! configuration knobs.

/// Priority attached to every request emitted by the timely-delta engine.
pub const BERTI_PREFETCH_PRIORITY: i32 = 32;

/// Fill latencies above this many cycles land in the last histogram bucket.
pub const FILL_LATENCY_HISTOGRAM_CAP: u64 = 500;

/// Width in cycles of one fill latency histogram bucket.
pub const FILL_LATENCY_BUCKET: u64 = 10;
