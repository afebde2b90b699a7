//! Per-entry delta set.
//!
//! Each history entry keeps up to `K` candidate deltas, each with a coverage
//! counter (how many searches found it timely) and a status derived from that
//! coverage. When a new delta arrives and the set is full, the candidate with
//! the lowest coverage is replaced; the first one found wins ties.

use std::fmt;

use crate::config::ConfidenceConfig;

/// What a delta may be used for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeltaStatus {
    /// Not confident enough to prefetch.
    #[default]
    NoPref,
    /// Confident enough to prefetch into the L2.
    L2Pref,
    /// Confident enough to prefetch into the L1.
    L1Pref,
}

impl DeltaStatus {
    /// Returns `true` for statuses that allow issuing a prefetch.
    pub fn is_actionable(self) -> bool {
        self != Self::NoPref
    }
}

/// One candidate delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeltaCandidate {
    /// Signed distance in cache lines. Never zero.
    pub delta: i64,
    /// Number of times the delta was found timely in the current window.
    pub coverage: u32,
    /// Status assigned at the last recompute.
    pub status: DeltaStatus,
}

/// Result of feeding one delta into a [`DeltaSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// An existing candidate's coverage was incremented.
    Reinforced,
    /// The delta took a free slot.
    Added,
    /// The delta replaced the given minimum-coverage candidate.
    Replaced(DeltaCandidate),
    /// Zero deltas are never stored.
    Ignored,
}

/// Fixed-capacity set of candidate deltas.
#[derive(Clone, Debug, Default)]
pub struct DeltaSet {
    slots: Vec<DeltaCandidate>,
    capacity: usize,
}

impl DeltaSet {
    /// Creates an empty set holding at most `capacity` candidates.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of live candidates.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the set holds no candidate.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of candidates.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Candidates in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &DeltaCandidate> {
        self.slots.iter()
    }

    /// Candidate holding `delta`, if any.
    pub fn get(&self, delta: i64) -> Option<&DeltaCandidate> {
        self.slots.iter().find(|c| c.delta == delta)
    }

    /// Records that `delta` was found timely once.
    pub fn observe(&mut self, delta: i64) -> Observation {
        if delta == 0 || self.capacity == 0 {
            return Observation::Ignored;
        }
        if let Some(candidate) = self.slots.iter_mut().find(|c| c.delta == delta) {
            candidate.coverage = candidate.coverage.saturating_add(1);
            return Observation::Reinforced;
        }

        let fresh = DeltaCandidate {
            delta,
            coverage: 1,
            status: DeltaStatus::NoPref,
        };
        if self.slots.len() < self.capacity {
            self.slots.push(fresh);
            return Observation::Added;
        }

        let victim = self.min_coverage_slot();
        let evicted = std::mem::replace(&mut self.slots[victim], fresh);
        Observation::Replaced(evicted)
    }

    /// Index of the first candidate with the lowest coverage.
    fn min_coverage_slot(&self) -> usize {
        let mut min = 0;
        for (i, candidate) in self.slots.iter().enumerate() {
            if candidate.coverage < self.slots[min].coverage {
                min = i;
            }
        }
        min
    }

    /// Grades every candidate against `searches` and returns the best promoted one.
    ///
    /// A candidate is `L1Pref` when its coverage is at least `l1_coverage_percent`
    /// of `searches`, `L2Pref` when at least `l2_coverage_percent`, otherwise
    /// `NoPref`. The best candidate is the promoted one with the highest coverage,
    /// the earliest slot winning ties.
    pub fn grade(&mut self, searches: u32, policy: &ConfidenceConfig) -> Option<DeltaCandidate> {
        let searches = u64::from(searches);
        let mut best: Option<DeltaCandidate> = None;
        for candidate in &mut self.slots {
            let scaled = u64::from(candidate.coverage) * 100;
            candidate.status = if scaled >= u64::from(policy.l1_coverage_percent) * searches {
                DeltaStatus::L1Pref
            } else if scaled >= u64::from(policy.l2_coverage_percent) * searches {
                DeltaStatus::L2Pref
            } else {
                DeltaStatus::NoPref
            };
            if candidate.status.is_actionable()
                && best.is_none_or(|b| candidate.coverage > b.coverage)
            {
                best = Some(*candidate);
            }
        }
        best
    }

    /// Zeroes every coverage counter, keeping deltas and statuses.
    pub fn reset_coverage(&mut self) {
        for candidate in &mut self.slots {
            candidate.coverage = 0;
        }
    }

    /// Removes every candidate.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl fmt::Display for DeltaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:+}:{}/{:?}", c.delta, c.coverage, c.status)?;
        }
        write!(f, "]")
    }
}
