//! Delta Set Tests.
//!
//! Verifies observation (reinforce, add, replace), the minimum-coverage
//! replacement rule, and coverage-based grading into L1/L2/no prefetch.

use berti_core::config::ConfidenceConfig;
use berti_core::core::units::prefetch::berti::delta::{
    DeltaCandidate, DeltaSet, DeltaStatus, Observation,
};
use pretty_assertions::assert_eq;

fn coverages(set: &DeltaSet) -> Vec<(i64, u32)> {
    set.iter().map(|c| (c.delta, c.coverage)).collect()
}

// ══════════════════════════════════════════════════════════
// 1. Observation
// ══════════════════════════════════════════════════════════

#[test]
fn new_delta_takes_free_slot() {
    let mut set = DeltaSet::new(4);
    assert!(set.is_empty());
    assert_eq!(set.observe(3), Observation::Added);
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.get(3),
        Some(&DeltaCandidate {
            delta: 3,
            coverage: 1,
            status: DeltaStatus::NoPref
        })
    );
}

#[test]
fn repeated_delta_is_reinforced() {
    let mut set = DeltaSet::new(4);
    let _ = set.observe(-2);
    assert_eq!(set.observe(-2), Observation::Reinforced);
    assert_eq!(set.observe(-2), Observation::Reinforced);
    assert_eq!(coverages(&set), vec![(-2, 3)]);
}

#[test]
fn zero_delta_is_ignored() {
    let mut set = DeltaSet::new(4);
    assert_eq!(set.observe(0), Observation::Ignored);
    assert!(set.is_empty());
}

// ══════════════════════════════════════════════════════════
// 2. Replacement
// ══════════════════════════════════════════════════════════

/// A full set replaces its lowest-coverage candidate.
#[test]
fn full_set_replaces_minimum_coverage() {
    let mut set = DeltaSet::new(3);
    for d in [1, 1, 1, 2, 3, 3] {
        let _ = set.observe(d);
    }
    assert_eq!(coverages(&set), vec![(1, 3), (2, 1), (3, 2)]);

    let evicted = set.observe(9);
    assert_eq!(
        evicted,
        Observation::Replaced(DeltaCandidate {
            delta: 2,
            coverage: 1,
            status: DeltaStatus::NoPref
        })
    );
    assert_eq!(coverages(&set), vec![(1, 3), (9, 1), (3, 2)]);
    assert_eq!(set.len(), set.capacity());
}

/// Among equal minima, the first slot is replaced.
#[test]
fn replacement_tie_takes_first_slot() {
    let mut set = DeltaSet::new(3);
    for d in [4, 5, 6] {
        let _ = set.observe(d);
    }
    let _ = set.observe(7);
    assert_eq!(coverages(&set), vec![(7, 1), (5, 1), (6, 1)]);
}

/// A replacement starts from scratch: coverage 1, no prefetch.
#[test]
fn replaced_delta_starts_at_coverage_one() {
    let mut set = DeltaSet::new(2);
    for d in [1, 1, 2, 2, 3] {
        let _ = set.observe(d);
    }
    let c = set.get(3).unwrap();
    assert_eq!(c.coverage, 1);
    assert_eq!(c.status, DeltaStatus::NoPref);
}

// ══════════════════════════════════════════════════════════
// 3. Grading
// ══════════════════════════════════════════════════════════

/// After 6 searches, L1 needs coverage 4 (65% of 6 rounded up) and L2 needs 3.
#[test]
fn grading_uses_coverage_watermarks() {
    let policy = ConfidenceConfig::default();
    let mut set = DeltaSet::new(4);
    for (delta, hits) in [(1, 4), (2, 3), (3, 2)] {
        for _ in 0..hits {
            let _ = set.observe(delta);
        }
    }

    let best = set.grade(6, &policy).unwrap();
    assert_eq!(best.delta, 1);
    assert_eq!(best.status, DeltaStatus::L1Pref);
    assert_eq!(set.get(1).unwrap().status, DeltaStatus::L1Pref);
    assert_eq!(set.get(2).unwrap().status, DeltaStatus::L2Pref);
    assert_eq!(set.get(3).unwrap().status, DeltaStatus::NoPref);
}

#[test]
fn grading_without_promotion_returns_none() {
    let policy = ConfidenceConfig::default();
    let mut set = DeltaSet::new(4);
    let _ = set.observe(5);
    assert_eq!(set.grade(10, &policy), None);
    assert_eq!(set.get(5).unwrap().status, DeltaStatus::NoPref);
}

/// Equal coverage: the earlier slot is the best delta.
#[test]
fn grading_tie_prefers_earlier_slot() {
    let policy = ConfidenceConfig::default();
    let mut set = DeltaSet::new(4);
    for d in [8, -8, 8, -8] {
        let _ = set.observe(d);
    }
    let best = set.grade(2, &policy).unwrap();
    assert_eq!(best.delta, 8);
}

#[test]
fn grading_can_demote() {
    let policy = ConfidenceConfig::default();
    let mut set = DeltaSet::new(2);
    for _ in 0..6 {
        let _ = set.observe(2);
    }
    assert_eq!(set.grade(6, &policy).unwrap().status, DeltaStatus::L1Pref);
    assert_eq!(set.grade(12, &policy).unwrap().status, DeltaStatus::L2Pref);
    assert_eq!(set.grade(100, &policy), None);
}

#[test]
fn reset_keeps_deltas_and_statuses() {
    let policy = ConfidenceConfig::default();
    let mut set = DeltaSet::new(2);
    for _ in 0..6 {
        let _ = set.observe(2);
    }
    let _ = set.grade(6, &policy);
    set.reset_coverage();

    let c = set.get(2).unwrap();
    assert_eq!(c.coverage, 0);
    assert_eq!(c.status, DeltaStatus::L1Pref);

    set.clear();
    assert!(set.is_empty());
}

#[test]
fn actionable_statuses() {
    assert!(!DeltaStatus::NoPref.is_actionable());
    assert!(DeltaStatus::L2Pref.is_actionable());
    assert!(DeltaStatus::L1Pref.is_actionable());
}

#[test]
fn display_lists_candidates() {
    let mut set = DeltaSet::new(2);
    let _ = set.observe(5);
    let _ = set.observe(-1);
    assert_eq!(set.to_string(), "[+5:1/NoPref, -1:1/NoPref]");
}
