//! Pseudo-LRU (PLRU) Replacement Policy.
//!
//! Keeps one "recently used" bit per way. A use sets the way's bit; when every
//! bit in the set would be set, all other bits are cleared. The victim is the
//! lowest way whose bit is clear.
//!
//! # Performance
//!
//! - `touch()` / `insert()`: O(W)
//! - `victim()`: O(W)
//! - **Space Complexity:** O(S × W) bits

use super::ReplacementPolicy;

/// PLRU Policy state.
#[derive(Debug)]
pub struct PlruPolicy {
    /// Recently-used bits, laid out set-major.
    used: Vec<bool>,
    /// Number of ways per set.
    ways: usize,
}

impl PlruPolicy {
    /// Creates a new PLRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the table.
    /// * `ways` - The associativity of the table.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            used: vec![false; sets * ways],
            ways,
        }
    }

    fn mark(&mut self, set: usize, way: usize) {
        let bits = &mut self.used[set * self.ways..(set + 1) * self.ways];
        bits[way] = true;
        if bits.iter().all(|&b| b) {
            bits.fill(false);
            bits[way] = true;
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.mark(set, way);
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.mark(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        let bits = &self.used[set * self.ways..(set + 1) * self.ways];
        bits.iter().position(|&b| !b).unwrap_or(0)
    }
}
