//! History Table Tests.
//!
//! Verifies per-PC allocation, bounded access history, security-domain
//! separation, and the hysteresis bit that lets a recently hit predictor
//! survive one eviction attempt.

use berti_core::common::LineAddr;
use berti_core::config::HistoryTableConfig;
use berti_core::core::units::prefetch::berti::history::{
    AccessRecord, HistoryTable, RecordOutcome,
};
use berti_core::core::units::prefetch::berti::DeltaStatus;
use pretty_assertions::assert_eq;

const PC_A: u64 = 0x1000;
const PC_B: u64 = 0x2000;

fn table(entries: usize, ways: usize, max_history: usize) -> HistoryTable {
    HistoryTable::new(&HistoryTableConfig {
        entries,
        ways,
        max_history,
        ..HistoryTableConfig::default()
    })
    .unwrap()
}

fn lines(t: &HistoryTable, pc: u64) -> Vec<(u64, u64)> {
    t.lookup(pc, false)
        .unwrap()
        .history()
        .iter()
        .map(|r| (r.line.val(), r.timestamp))
        .collect()
}

// ══════════════════════════════════════════════════════════
// 1. Allocation and Hits
// ══════════════════════════════════════════════════════════

#[test]
fn first_access_allocates_without_match() {
    let mut t = table(8, 2, 4);
    let outcome = t.record_access(PC_A, false, LineAddr(100), 0);
    assert_eq!(outcome, RecordOutcome::default());
    assert_eq!(t.len(), 1);

    let entry = t.lookup(PC_A, false).unwrap();
    assert_eq!(entry.pc(), PC_A);
    assert!(!entry.secure());
    assert!(!entry.hysteresis);
    assert_eq!(entry.counter, 0);
    assert!(entry.deltas().is_empty());
    assert_eq!(entry.best_delta(), 0);
    assert_eq!(entry.best_status(), DeltaStatus::NoPref);
}

#[test]
fn second_access_matches_and_appends() {
    let mut t = table(8, 2, 4);
    let _ = t.record_access(PC_A, false, LineAddr(100), 0);
    let outcome = t.record_access(PC_A, false, LineAddr(105), 5);

    assert!(outcome.matched);
    assert_eq!(lines(&t, PC_A), vec![(100, 0), (105, 5)]);
    assert!(t.lookup(PC_A, false).unwrap().hysteresis);
}

#[test]
fn history_drops_oldest_when_full() {
    let mut t = table(8, 2, 3);
    for i in 0..5 {
        let _ = t.record_access(PC_A, false, LineAddr(10 + i), i);
    }
    assert_eq!(lines(&t, PC_A), vec![(12, 2), (13, 3), (14, 4)]);
}

#[test]
fn secure_and_non_secure_are_separate_predictors() {
    let mut t = table(8, 2, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    let outcome = t.record_access(PC_A, true, LineAddr(2), 1);

    assert!(!outcome.matched);
    assert_eq!(t.len(), 2);
    assert!(t.lookup(PC_A, true).unwrap().secure());
    assert_eq!(lines(&t, PC_A), vec![(1, 0)]);
}

// ══════════════════════════════════════════════════════════
// 2. Replacement and Hysteresis
// ══════════════════════════════════════════════════════════

/// A hit entry absorbs one eviction attempt and falls to the next.
#[test]
fn hysteresis_spares_victim_once() {
    let mut t = table(1, 1, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    let _ = t.record_access(PC_A, false, LineAddr(2), 1);

    let first = t.record_access(PC_B, false, LineAddr(50), 2);
    assert_eq!(
        first,
        RecordOutcome {
            matched: false,
            evicted_best_delta: None,
            hysteresis_saved: true,
        }
    );
    assert!(t.lookup(PC_B, false).is_none());
    let survivor = t.lookup(PC_A, false).unwrap();
    assert!(!survivor.hysteresis);
    assert_eq!(survivor.history().len(), 2);

    let second = t.record_access(PC_B, false, LineAddr(51), 3);
    assert!(!second.matched);
    assert!(!second.hysteresis_saved);
    assert!(t.lookup(PC_A, false).is_none());
    assert_eq!(lines(&t, PC_B), vec![(51, 3)]);
}

/// A never-hit entry is replaced on the first attempt.
#[test]
fn cold_entry_is_replaced_immediately() {
    let mut t = table(1, 1, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    let outcome = t.record_access(PC_B, false, LineAddr(2), 1);

    assert!(!outcome.hysteresis_saved);
    assert!(t.lookup(PC_A, false).is_none());
    assert!(t.lookup(PC_B, false).is_some());
}

/// Hitting again re-arms the bit after it was spent.
#[test]
fn hit_rearms_hysteresis() {
    let mut t = table(1, 1, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    let _ = t.record_access(PC_A, false, LineAddr(2), 1);
    assert!(t.record_access(PC_B, false, LineAddr(9), 2).hysteresis_saved);

    let _ = t.record_access(PC_A, false, LineAddr(3), 3);
    assert!(t.record_access(PC_B, false, LineAddr(9), 4).hysteresis_saved);
    assert_eq!(lines(&t, PC_A), vec![(1, 0), (2, 1), (3, 3)]);
}

/// Overwriting a predictor with a prefetchable best delta reports that delta.
#[test]
fn eviction_reports_actionable_best_delta() {
    let mut t = table(1, 1, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    t.lookup_mut(PC_A, false)
        .unwrap()
        .set_best(4, DeltaStatus::L1Pref);

    let outcome = t.record_access(PC_B, false, LineAddr(2), 1);
    assert_eq!(outcome.evicted_best_delta, Some(4));
}

#[test]
fn eviction_of_unconfident_predictor_reports_nothing() {
    let mut t = table(1, 1, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    t.lookup_mut(PC_A, false)
        .unwrap()
        .set_best(4, DeltaStatus::NoPref);

    let outcome = t.record_access(PC_B, false, LineAddr(2), 1);
    assert_eq!(outcome.evicted_best_delta, None);
}

/// A new predictor in a reused way starts from a clean slate.
#[test]
fn reused_way_starts_clean() {
    let mut t = table(1, 1, 4);
    let _ = t.record_access(PC_A, false, LineAddr(1), 0);
    {
        let entry = t.lookup_mut(PC_A, false).unwrap();
        entry.counter = 5;
        let _ = entry.deltas_mut().observe(3);
        entry.set_best(3, DeltaStatus::L2Pref);
    }
    let _ = t.record_access(PC_B, false, LineAddr(2), 1);

    let entry = t.lookup(PC_B, false).unwrap();
    assert_eq!(entry.counter, 0);
    assert!(entry.deltas().is_empty());
    assert_eq!(entry.best_delta(), 0);
    assert_eq!(
        entry.history().iter().copied().collect::<Vec<_>>(),
        vec![AccessRecord {
            line: LineAddr(2),
            timestamp: 1
        }]
    );
}

#[test]
fn table_never_exceeds_capacity() {
    let mut t = table(4, 2, 2);
    for pc in 0..64u64 {
        let _ = t.record_access(pc * 2, false, LineAddr(pc), pc);
        assert!(t.len() <= t.capacity());
    }
    assert_eq!(t.len(), 4);
    assert_eq!(t.iter().count(), 4);
}
