//! Least Recently Used (LRU) Replacement Policy.
//!
//! Keeps a recency stack per set. Touching or filling a way moves it to the top
//! (MRU position); the bottom of the stack is the victim.
//!
//! # Performance
//!
//! - `touch()` / `insert()`: O(W) where W is the number of ways
//! - `victim()`: O(1)
//! - **Space Complexity:** O(S × W)

use super::ReplacementPolicy;

/// LRU Policy state.
#[derive(Debug)]
pub struct LruPolicy {
    /// A vector of recency stacks (one per set).
    /// Index 0 is MRU, last index is LRU.
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
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

    /// Moves `way` to the MRU position of `set`.
    fn promote(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }
}

impl ReplacementPolicy for LruPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.promote(set, way);
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.promote(set, way);
    }

    /// Returns the way at the bottom of the recency stack.
    fn victim(&mut self, set: usize) -> usize {
        self.usage[set].last().copied().unwrap_or(0)
    }
}
