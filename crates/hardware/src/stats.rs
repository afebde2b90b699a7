//! Prefetcher statistics collection and reporting.
//!
//! This module tracks what the prefetcher observed and did. It provides:
//! 1. **Training:** Hit and miss accesses seen, per-PC training samples.
//! 2. **Fills:** Demand and prefetch fills, measured fill latencies.
//! 3. **Learning:** Timely deltas found and history records rejected as untimely.
//! 4. **Issue:** Requests sent and suppressed by the redundant filter, per-delta samples.
//! 5. **Table:** Predictors evicted and evictions absorbed by hysteresis.
//!
//! Statistics only observe the engine; nothing here feeds back into a decision.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::common::constants::{FILL_LATENCY_BUCKET, FILL_LATENCY_HISTOGRAM_CAP};

/// Prefetcher statistics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BertiStats {
    /// Training accesses that hit in the cache.
    pub train_hits: u64,
    /// Training accesses that missed in the cache.
    pub train_misses: u64,
    /// Training accesses per PC.
    pub train_pc: BTreeMap<u64, u64>,

    /// Fills of prefetch requests (not used for learning).
    pub fill_prefetch: u64,
    /// Fills of demand misses.
    pub fill_miss: u64,
    /// Demand fills per PC.
    pub fill_pc: BTreeMap<u64, u64>,
    /// Demand fill latencies, bucketed (see [`BertiStats::latency_bucket`]).
    pub fill_latency: BTreeMap<u64, u64>,
    /// Fills dropped for lacking a PC or virtual address, or being instruction fetches.
    pub fill_skipped: u64,

    /// Timely deltas collected across all searches.
    pub timely_deltas: u64,
    /// History records rejected because they would not have arrived in time.
    pub untimely_records: u64,

    /// Requests handed to the caller.
    pub pf_sent: u64,
    /// Requests suppressed because the address was recently issued.
    pub pf_filtered: u64,
    /// Issue attempts per delta.
    pub pf_delta: BTreeMap<i64, u64>,

    /// Live predictors overwritten by a new PC.
    pub predictors_evicted: u64,
    /// Eviction attempts absorbed by a victim's hysteresis bit.
    pub hysteresis_saves: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"training"`, `"fills"`, `"issue"`, `"table"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["training", "fills", "issue", "table"];

impl BertiStats {
    /// Maps a fill latency to its histogram bucket.
    ///
    /// Latencies are rounded up to the next multiple of the bucket width and
    /// clamped at the histogram cap.
    pub const fn latency_bucket(latency: u64) -> u64 {
        if latency > FILL_LATENCY_HISTOGRAM_CAP {
            FILL_LATENCY_HISTOGRAM_CAP
        } else {
            latency.div_ceil(FILL_LATENCY_BUCKET) * FILL_LATENCY_BUCKET
        }
    }

    pub(crate) fn sample_train_pc(&mut self, pc: u64) {
        *self.train_pc.entry(pc).or_default() += 1;
    }

    pub(crate) fn sample_fill(&mut self, pc: u64, latency: u64) {
        *self.fill_pc.entry(pc).or_default() += 1;
        *self
            .fill_latency
            .entry(Self::latency_bucket(latency))
            .or_default() += 1;
    }

    pub(crate) fn sample_pf_delta(&mut self, delta: i64) {
        *self.pf_delta.entry(delta).or_default() += 1;
    }

    /// Fraction of issue attempts that reached the caller, in percent.
    pub fn issue_rate(&self) -> f64 {
        let attempts = self.pf_sent + self.pf_filtered;
        if attempts == 0 {
            0.0
        } else {
            (self.pf_sent as f64 / attempts as f64) * 100.0
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        println!("\n==========================================================");
        println!("BERTI PREFETCHER STATISTICS");
        println!("==========================================================");
        if want("training") {
            println!("TRAINING");
            println!("  train.hits             {}", self.train_hits);
            println!("  train.misses           {}", self.train_misses);
            println!("  train.pcs              {}", self.train_pc.len());
            println!("  learn.timely_deltas    {}", self.timely_deltas);
            println!("  learn.untimely         {}", self.untimely_records);
            println!("----------------------------------------------------------");
        }
        if want("fills") {
            println!("FILLS");
            println!("  fill.miss              {}", self.fill_miss);
            println!("  fill.prefetch          {}", self.fill_prefetch);
            println!("  fill.skipped           {}", self.fill_skipped);
            for (bucket, count) in &self.fill_latency {
                println!("  fill.latency<={:<8} {}", bucket, count);
            }
            println!("----------------------------------------------------------");
        }
        if want("issue") {
            println!("ISSUE");
            println!("  pf.sent                {}", self.pf_sent);
            println!("  pf.filtered            {}", self.pf_filtered);
            println!("  pf.issue_rate          {:.2}%", self.issue_rate());
            for (delta, count) in &self.pf_delta {
                println!("  pf.delta[{:>+6}]        {}", delta, count);
            }
            println!("----------------------------------------------------------");
        }
        if want("table") {
            println!("HISTORY TABLE");
            println!("  table.evicted          {}", self.predictors_evicted);
            println!("  table.hysteresis_saves {}", self.hysteresis_saves);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
