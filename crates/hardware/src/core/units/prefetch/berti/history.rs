//! History table.
//!
//! A set-associative table keyed by instruction address and security domain.
//! Each entry remembers the most recent lines its PC touched (with the cycle of
//! each touch) and owns the delta set learned for that PC.
//!
//! Replacement is guarded by a hysteresis bit: an entry that has been hit since
//! it was last considered for eviction survives one eviction attempt, during
//! which the bit is cleared. Only an entry whose bit is already clear is
//! overwritten.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use super::delta::{DeltaSet, DeltaStatus};
use crate::common::{ConfigError, Cycle, LineAddr};
use crate::config::HistoryTableConfig;
use crate::core::units::table::{AssocTable, TableKey};

/// Tag of a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    /// Instruction address.
    pub pc: u64,
    /// Security domain of the access.
    pub secure: bool,
}

impl TableKey for HistoryKey {
    /// Drops the always-zero low bit of 2-byte aligned instruction addresses.
    fn set_hash(&self) -> u64 {
        self.pc >> 1
    }
}

/// One access remembered by a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRecord {
    /// Line that was accessed.
    pub line: LineAddr,
    /// Cycle the access was observed.
    pub timestamp: Cycle,
}

/// A learned predictor for one PC.
#[derive(Clone, Debug, Default)]
pub struct HistoryEntry {
    pc: u64,
    secure: bool,
    history: VecDeque<AccessRecord>,
    max_history: usize,
    /// Set on every hit; cleared instead of evicting the entry once.
    pub hysteresis: bool,
    /// Searches run since the last confidence reset.
    pub counter: u32,
    deltas: DeltaSet,
    best_delta: i64,
    best_status: DeltaStatus,
}

impl HistoryEntry {
    /// Creates an entry whose history holds only `first`.
    ///
    /// # Arguments
    ///
    /// * `pc` / `secure` - The key the entry is installed under.
    /// * `first` - The access that allocated the entry.
    /// * `max_history` - Records kept before the oldest is dropped.
    /// * `delta_slots` - Capacity of the delta set.
    pub fn new(
        pc: u64,
        secure: bool,
        first: AccessRecord,
        max_history: usize,
        delta_slots: usize,
    ) -> Self {
        let mut history = VecDeque::with_capacity(max_history);
        history.push_back(first);
        Self {
            pc,
            secure,
            history,
            max_history,
            hysteresis: false,
            counter: 0,
            deltas: DeltaSet::new(delta_slots),
            best_delta: 0,
            best_status: DeltaStatus::NoPref,
        }
    }

    /// Instruction address of the entry.
    pub const fn pc(&self) -> u64 {
        self.pc
    }

    /// Security domain of the entry.
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// Appends a record, dropping the oldest one when full.
    pub fn push(&mut self, record: AccessRecord) {
        if self.history.len() >= self.max_history {
            let _ = self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Remembered accesses, oldest first.
    pub const fn history(&self) -> &VecDeque<AccessRecord> {
        &self.history
    }

    /// Learned delta candidates.
    pub const fn deltas(&self) -> &DeltaSet {
        &self.deltas
    }

    /// Mutable delta candidates.
    pub const fn deltas_mut(&mut self) -> &mut DeltaSet {
        &mut self.deltas
    }

    /// Best delta chosen at the last recompute, or 0.
    pub const fn best_delta(&self) -> i64 {
        self.best_delta
    }

    /// Status of the best delta.
    pub const fn best_status(&self) -> DeltaStatus {
        self.best_status
    }

    /// Replaces the best-delta summary.
    pub const fn set_best(&mut self, delta: i64, status: DeltaStatus) {
        self.best_delta = delta;
        self.best_status = status;
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pc {:#x} counter {} best {:+}/{:?} deltas {}",
            self.pc, self.counter, self.best_delta, self.best_status, self.deltas
        )
    }
}

/// Outcome of [`HistoryTable::record_access`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    /// The PC already had an entry; the access was appended to it.
    pub matched: bool,
    /// Best delta of a live predictor that was overwritten to make room.
    pub evicted_best_delta: Option<i64>,
    /// The chosen victim was spared because its hysteresis bit was set.
    pub hysteresis_saved: bool,
}

/// History table keyed by PC and security domain.
#[derive(Debug)]
pub struct HistoryTable {
    table: AssocTable<HistoryKey, HistoryEntry>,
    max_history: usize,
    delta_slots: usize,
}

impl HistoryTable {
    /// Creates a history table with the configured shape.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the table shape is invalid.
    pub fn new(config: &HistoryTableConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table: AssocTable::new("history table", config.entries, config.ways, config.policy)?,
            max_history: config.max_history,
            delta_slots: config.delta_slots,
        })
    }

    /// Entry for `(pc, secure)`, if present.
    pub fn lookup(&self, pc: u64, secure: bool) -> Option<&HistoryEntry> {
        self.table
            .find(&HistoryKey { pc, secure })
            .map(|slot| self.table.get(slot))
    }

    /// Mutable entry for `(pc, secure)`, if present.
    pub fn lookup_mut(&mut self, pc: u64, secure: bool) -> Option<&mut HistoryEntry> {
        let slot = self.table.find(&HistoryKey { pc, secure })?;
        Some(self.table.get_mut(slot))
    }

    /// Records an access by `pc`, allocating an entry for it if possible.
    ///
    /// On a hit the access is appended to the entry's history and the entry's
    /// hysteresis bit is set. On a miss the victim way either absorbs the
    /// attempt (hysteresis set: the bit is cleared and the entry re-inserted
    /// under its own key) or is overwritten with a fresh entry for `pc`. Only
    /// a hit reports `matched`.
    pub fn record_access(
        &mut self,
        pc: u64,
        secure: bool,
        line: LineAddr,
        timestamp: Cycle,
    ) -> RecordOutcome {
        let key = HistoryKey { pc, secure };
        let record = AccessRecord { line, timestamp };

        if let Some(slot) = self.table.find(&key) {
            self.table.touch(slot);
            let entry = self.table.get_mut(slot);
            entry.push(record);
            entry.hysteresis = true;
            debug!(pc = format_args!("{pc:#x}"), %line, "history table hit");
            return RecordOutcome {
                matched: true,
                ..RecordOutcome::default()
            };
        }

        debug!(pc = format_args!("{pc:#x}"), "history table miss");
        let slot = self.table.find_victim(&key);
        if let Some(resident) = self.table.key(slot) {
            let victim = self.table.get_mut(slot);
            if victim.hysteresis {
                victim.hysteresis = false;
                self.table.insert(resident, slot);
                return RecordOutcome {
                    hysteresis_saved: true,
                    ..RecordOutcome::default()
                };
            }
        }

        let evicted_best_delta = self
            .table
            .key(slot)
            .map(|_| self.table.get(slot))
            .filter(|victim| victim.best_status.is_actionable())
            .map(|victim| victim.best_delta);

        *self.table.get_mut(slot) =
            HistoryEntry::new(pc, secure, record, self.max_history, self.delta_slots);
        self.table.insert(key, slot);

        RecordOutcome {
            matched: false,
            evicted_best_delta,
            hysteresis_saved: false,
        }
    }

    /// Live entries.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.table.iter().map(|(_, entry)| entry)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no entry is live.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }
}
