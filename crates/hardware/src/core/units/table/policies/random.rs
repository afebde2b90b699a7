//! Random Replacement Policy.
//!
//! Evicts a pseudo-random way using a xorshift generator, so runs stay
//! reproducible without pulling in a full RNG.

use super::ReplacementPolicy;

/// Seed used by [`RandomPolicy::new`].
const DEFAULT_SEED: u64 = 123_456_789;

/// Random Policy state.
#[derive(Debug)]
pub struct RandomPolicy {
    /// Number of ways per set.
    ways: usize,
    /// Generator state (never zero).
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - Unused; kept so every policy shares one constructor shape.
    /// * `ways` - The associativity of the table.
    pub const fn new(_sets: usize, ways: usize) -> Self {
        Self::with_seed(ways, DEFAULT_SEED)
    }

    /// Creates a Random policy with an explicit generator seed.
    ///
    /// A zero seed is replaced by the default seed, since xorshift stalls at zero.
    pub const fn with_seed(ways: usize, seed: u64) -> Self {
        Self {
            ways,
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn touch(&mut self, _set: usize, _way: usize) {}

    fn insert(&mut self, _set: usize, _way: usize) {}

    fn victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % self.ways as u64) as usize
    }
}
