//! Table Replacement Policies.
//!
//! Implements the algorithms that pick a victim way inside one set of an
//! [`AssocTable`](super::AssocTable).
//!
//! # Policies
//!
//! - `Fifo`: First-In, First-Out (insertion order).
//! - `Lru`: Least Recently Used.
//! - `Mru`: Most Recently Used.
//! - `Plru`: Single-bit pseudo-LRU.
//! - `Random`: Pseudo-random selection.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Most Recently Used replacement policy.
pub mod mru;

/// Pseudo-LRU (MRU-bit) replacement policy.
pub mod plru;

/// Random replacement policy.
pub mod random;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use plru::PlruPolicy;
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for table replacement policies.
///
/// A table reports two kinds of events: an existing entry being used again
/// (`touch`) and a way being (re)filled (`insert`). Policies that do not
/// distinguish the two treat both as a use.
pub trait ReplacementPolicy: Send + Sync {
    /// Records a use of an already valid way.
    ///
    /// # Arguments
    ///
    /// * `set` - The set index.
    /// * `way` - The way index within the set.
    fn touch(&mut self, set: usize, way: usize);

    /// Records that `way` was just filled with a new or re-inserted entry.
    fn insert(&mut self, set: usize, way: usize);

    /// Selects the way to replace in `set` when every way is valid.
    ///
    /// # Returns
    ///
    /// A way index in `0..ways`.
    fn victim(&mut self, set: usize) -> usize;
}

/// Builds the policy selected by configuration.
///
/// # Arguments
///
/// * `kind` - The configured policy.
/// * `sets` - The number of sets in the table.
/// * `ways` - The associativity of the table.
pub fn build(kind: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Mru => Box::new(MruPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
        PolicyType::Plru => Box::new(PlruPolicy::new(sets, ways)),
        PolicyType::Random => Box::new(RandomPolicy::new(sets, ways)),
    }
}
