//! Hardware Prefetcher interface and the Berti timely-delta prefetcher.
//!
//! This module contains the interface a cache model uses to drive a prefetcher,
//! the event descriptors passed across it, and the request type handed back.
//! Requests are advisory: the caller owns admission, throttling and issue.

/// The Berti timely-delta prefetcher.
pub mod berti;

/// Recency filter that suppresses re-issuing recently sent prefetches.
pub mod filter;

pub use self::berti::BertiPrefetcher;
pub use self::filter::RedundantPrefetchFilter;

use crate::common::Cycle;

/// Which prefetcher produced a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PrefetchSource {
    /// The timely-delta engine.
    Berti,
}

/// A prefetch request handed back to the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefetchRequest {
    /// Line-aligned byte address to prefetch.
    pub addr: u64,
    /// Queue priority; larger values are more urgent.
    pub priority: i32,
    /// Prefetcher that produced the request.
    pub source: PrefetchSource,
}

/// A demand access observed by the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessInfo {
    /// Instruction address of the load or store.
    pub pc: u64,
    /// Byte address accessed.
    pub addr: u64,
    /// Whether the access targets the secure address space.
    pub secure: bool,
    /// Whether the access missed in the cache.
    pub miss: bool,
    /// Cycle at which the access was observed.
    pub cycle: Cycle,
}

/// A completed fill delivered to the cache.
///
/// `pc` and `vaddr` are `None` when the request did not carry that metadata;
/// such fills cannot be attributed to a predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillInfo {
    /// Instruction address of the request that missed.
    pub pc: Option<u64>,
    /// Virtual byte address of the request.
    pub vaddr: Option<u64>,
    /// Whether the request targets the secure address space.
    pub secure: bool,
    /// Cycle the request was issued (when the demand needed the data).
    pub issue_cycle: Cycle,
    /// Cycle the fill completed.
    pub complete_cycle: Cycle,
    /// Whether the fill answers a prefetch rather than a demand miss.
    pub is_prefetch: bool,
    /// Whether the request was an instruction fetch.
    pub is_inst_fetch: bool,
}

/// Trait for cache prefetcher implementations.
///
/// Prefetchers observe demand accesses and fill completions and generate
/// prefetch requests to reduce miss penalties.
pub trait Prefetcher: Send + Sync {
    /// Observes a demand access and returns the prefetches it triggers.
    ///
    /// # Arguments
    ///
    /// * `access` - The access that reached the cache.
    ///
    /// # Returns
    ///
    /// Requests in issue order. Empty if nothing should be prefetched.
    fn notify_access(&mut self, access: &AccessInfo) -> Vec<PrefetchRequest>;

    /// Observes a completed fill.
    fn notify_fill(&mut self, fill: &FillInfo);
}
