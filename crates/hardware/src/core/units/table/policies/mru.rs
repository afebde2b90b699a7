//! Most Recently Used (MRU) Replacement Policy.
//!
//! Evicts the way used most recently. Useful for cyclic patterns larger than the
//! table, where the newest entry is the one least likely to be needed again soon.

use super::ReplacementPolicy;

/// MRU Policy state.
#[derive(Debug)]
pub struct MruPolicy {
    /// Recency stacks, one per set. Index 0 is the MRU position (victim).
    usage: Vec<Vec<usize>>,
}

impl MruPolicy {
    /// Creates a new MRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the table.
    /// * `ways` - The associativity of the table.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }

    fn promote(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }
}

impl ReplacementPolicy for MruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.promote(set, way);
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.promote(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        self.usage[set].first().copied().unwrap_or(0)
    }
}
