//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! Evicts the way that was filled longest ago, regardless of how recently it was
//! used. Each fill stamps the way with a monotonically increasing sequence
//! number; touches are ignored.
//!
//! # Performance
//!
//! - `touch()`: O(1)
//! - `insert()`: O(1)
//! - `victim()`: O(W)
//! - **Space Complexity:** O(S × W) sequence numbers

use super::ReplacementPolicy;

/// FIFO Policy state.
#[derive(Debug)]
pub struct FifoPolicy {
    /// Fill sequence number per way, laid out set-major.
    filled_at: Vec<u64>,
    /// Next sequence number to hand out.
    sequence: u64,
    /// Number of ways per set.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the table.
    /// * `ways` - The associativity of the table.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            filled_at: vec![0; sets * ways],
            sequence: 1,
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn touch(&mut self, _set: usize, _way: usize) {}

    fn insert(&mut self, set: usize, way: usize) {
        self.filled_at[set * self.ways + way] = self.sequence;
        self.sequence += 1;
    }

    /// Returns the oldest filled way; the lowest index wins ties.
    fn victim(&mut self, set: usize) -> usize {
        let base = set * self.ways;
        let stamps = &self.filled_at[base..base + self.ways];
        let mut oldest = 0;
        for (way, &stamp) in stamps.iter().enumerate() {
            if stamp < stamps[oldest] {
                oldest = way;
            }
        }
        oldest
    }
}
