//! Berti Prefetcher.
//!
//! A per-PC delta prefetcher that only learns deltas which would have been
//! *timely*. For every load PC it keeps a short, cycle-stamped history of the
//! lines that PC touched. When a demand miss for that PC completes, the measured
//! fill latency tells which of those past accesses could have launched a
//! prefetch early enough to hide the miss; the deltas from those accesses to the
//! missing line are counted. Deltas that keep turning up become the PC's
//! prefetch deltas.
//!
//! Two events drive the engine:
//! - `on_access`: every demand access. Hits train against the last measured
//!   latency, the history table is updated, and a matched predictor issues
//!   prefetches through the redundant filter.
//! - `on_fill`: every completed fill. Demand fills update the latency estimate
//!   and train the predictor of the PC that missed.
//!
//! # Performance
//!
//! - `on_access()`: O(W + H + K) where W is the history table associativity,
//!   H the history length and K the delta set capacity
//! - `on_fill()`: O(W + H·K)
//! - **Space Complexity:** O(E × (H + K)) for E history entries

/// Delta candidates and their confidence grading.
pub mod delta;

/// History table and its hysteresis-guarded replacement.
pub mod history;

/// Timely delta search.
pub mod timely;

use tracing::debug;

pub use self::delta::{DeltaCandidate, DeltaSet, DeltaStatus};
pub use self::history::{AccessRecord, HistoryEntry, HistoryTable, RecordOutcome};
pub use self::timely::{SearchParams, SearchReport, search_timely_deltas};

use super::{AccessInfo, FillInfo, PrefetchRequest, PrefetchSource, Prefetcher};
use super::filter::RedundantPrefetchFilter;
use crate::common::constants::BERTI_PREFETCH_PRIORITY;
use crate::common::{ConfigError, Cycle, LineAddr};
use crate::config::{Config, IssueMode};
use crate::stats::BertiStats;

/// Berti prefetcher state.
#[derive(Debug)]
pub struct BertiPrefetcher {
    history: HistoryTable,
    filter: RedundantPrefetchFilter,
    search: SearchParams,
    issue_mode: IssueMode,
    block_shift: u32,
    fill_latency_bias: Cycle,
    /// Latency of the most recent demand fill, shared by every PC.
    last_fill_latency: Cycle,
    evicted_best_delta: Option<i64>,
    l1_best_delta: Option<i64>,
    stats: BertiStats,
}

impl BertiPrefetcher {
    /// Creates a prefetcher from a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`Config::validate`].
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let block_shift = config.block_shift();
        Ok(Self {
            history: HistoryTable::new(&config.history)?,
            filter: RedundantPrefetchFilter::new(&config.filter, block_shift)?,
            search: SearchParams {
                max_timely_deltas: config.history.max_timely_deltas,
                confidence: config.confidence.clone(),
            },
            issue_mode: config.issue_mode,
            block_shift,
            fill_latency_bias: config.fill_latency_bias,
            last_fill_latency: 0,
            evicted_best_delta: None,
            l1_best_delta: None,
            stats: BertiStats::default(),
        })
    }

    /// Trains on a demand access and returns the prefetches it triggers.
    pub fn on_access(&mut self, access: &AccessInfo) -> Vec<PrefetchRequest> {
        let line = LineAddr::from_byte(access.addr, self.block_shift);
        debug!(
            pc = format_args!("{:#x}", access.pc),
            %line,
            miss = access.miss,
            last_latency = self.last_fill_latency,
            "train prefetcher"
        );

        if access.miss {
            self.stats.train_misses += 1;
        } else {
            self.stats.train_hits += 1;
            if let Some(entry) = self.history.lookup_mut(access.pc, access.secure) {
                let report = search_timely_deltas(
                    entry,
                    self.last_fill_latency,
                    access.cycle,
                    line,
                    &self.search,
                );
                self.stats.timely_deltas += report.timely.len() as u64;
                self.stats.untimely_records += report.untimely as u64;
            }
        }
        self.stats.sample_train_pc(access.pc);

        let outcome = self
            .history
            .record_access(access.pc, access.secure, line, access.cycle);
        self.evicted_best_delta = outcome.evicted_best_delta;
        if outcome.evicted_best_delta.is_some() {
            self.stats.predictors_evicted += 1;
        }
        if outcome.hysteresis_saved {
            self.stats.hysteresis_saves += 1;
        }

        let mut requests = Vec::new();
        self.l1_best_delta = None;
        if !outcome.matched {
            return requests;
        }
        let Some(entry) = self.history.lookup(access.pc, access.secure) else {
            return requests;
        };

        let deltas: Vec<i64> = match self.issue_mode {
            IssueMode::Aggressive => entry
                .deltas()
                .iter()
                .filter(|c| c.status.is_actionable())
                .map(|c| c.delta)
                .collect(),
            IssueMode::Conservative => {
                let best = entry.best_delta();
                if best == 0 { Vec::new() } else { vec![best] }
            }
        };
        if entry.best_status() == DeltaStatus::L1Pref {
            self.l1_best_delta = Some(entry.best_delta());
        }

        for delta in deltas {
            debug!(delta, "using delta to prefetch");
            self.stats.sample_pf_delta(delta);
            let target = line.offset(delta).to_byte(self.block_shift);
            let _ = self.send_with_filter(
                target,
                &mut requests,
                BERTI_PREFETCH_PRIORITY,
                PrefetchSource::Berti,
            );
        }
        requests
    }

    /// Appends a request for `addr` unless it was recently issued.
    ///
    /// # Returns
    ///
    /// `true` if the request was appended and recorded in the filter.
    pub fn send_with_filter(
        &mut self,
        addr: u64,
        out: &mut Vec<PrefetchRequest>,
        priority: i32,
        source: PrefetchSource,
    ) -> bool {
        if self.filter.contains(addr) {
            debug!(addr = format_args!("{addr:#x}"), "skip recently prefetched");
            self.stats.pf_filtered += 1;
            return false;
        }
        debug!(addr = format_args!("{addr:#x}"), "send prefetch");
        self.filter.insert(addr);
        out.push(PrefetchRequest {
            addr,
            priority,
            source,
        });
        self.stats.pf_sent += 1;
        true
    }

    /// Consumes a fill completion: updates the latency estimate and trains.
    ///
    /// Instruction fetches and fills without a PC or virtual address are
    /// ignored. Prefetch fills are only counted.
    pub fn on_fill(&mut self, fill: &FillInfo) {
        let (Some(pc), Some(vaddr)) = (fill.pc, fill.vaddr) else {
            debug!(?fill, "skip fill without pc or vaddr");
            self.stats.fill_skipped += 1;
            return;
        };
        if fill.is_inst_fetch {
            debug!(?fill, "skip instruction fetch fill");
            self.stats.fill_skipped += 1;
            return;
        }
        if fill.is_prefetch {
            self.stats.fill_prefetch += 1;
            return;
        }
        self.stats.fill_miss += 1;

        let latency = fill
            .complete_cycle
            .saturating_sub(fill.issue_cycle)
            .saturating_add(self.fill_latency_bias);
        self.last_fill_latency = latency;
        self.stats.sample_fill(pc, latency);

        let Some(entry) = self.history.lookup_mut(pc, fill.secure) else {
            return;
        };
        debug!(
            pc = format_args!("{pc:#x}"),
            latency, "updating table of deltas"
        );
        let report = search_timely_deltas(
            entry,
            latency,
            fill.issue_cycle,
            LineAddr::from_byte(vaddr, self.block_shift),
            &self.search,
        );
        self.stats.timely_deltas += report.timely.len() as u64;
        self.stats.untimely_records += report.untimely as u64;
    }

    /// Current fill latency estimate in cycles.
    pub const fn last_fill_latency(&self) -> Cycle {
        self.last_fill_latency
    }

    /// Best delta of the predictor destroyed by the last access, if any.
    pub const fn last_evicted_best_delta(&self) -> Option<i64> {
        self.evicted_best_delta
    }

    /// Best delta of the predictor matched by the last access, if L1-confident.
    pub const fn l1_best_delta(&self) -> Option<i64> {
        self.l1_best_delta
    }

    /// The history table.
    pub const fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// The redundant prefetch filter.
    pub const fn filter(&self) -> &RedundantPrefetchFilter {
        &self.filter
    }

    /// Collected statistics.
    pub const fn stats(&self) -> &BertiStats {
        &self.stats
    }

    /// Issue mode chosen at construction.
    pub const fn issue_mode(&self) -> IssueMode {
        self.issue_mode
    }

    /// log2 of the cache line size.
    pub const fn block_shift(&self) -> u32 {
        self.block_shift
    }
}

impl Prefetcher for BertiPrefetcher {
    fn notify_access(&mut self, access: &AccessInfo) -> Vec<PrefetchRequest> {
        self.on_access(access)
    }

    fn notify_fill(&mut self, fill: &FillInfo) {
        self.on_fill(fill);
    }
}
