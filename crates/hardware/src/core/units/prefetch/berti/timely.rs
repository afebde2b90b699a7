//! Timely delta search.
//!
//! Given a demand that needed `miss_line` at `demand_cycle`, walk the entry's
//! history from newest to oldest and ask, for every remembered access: had a
//! prefetch for `miss_line` been issued at that access, would it have arrived
//! by `demand_cycle` given the current fill latency? Each access that passes
//! contributes the delta `miss_line - line` to the entry's delta set.
//!
//! The search also drives the entry's confidence window: statuses are regraded
//! once enough searches have run, and coverage restarts periodically so the
//! entry keeps adapting.

use tracing::trace;

use super::delta::{DeltaStatus, Observation};
use super::history::HistoryEntry;
use crate::common::{Cycle, LineAddr};
use crate::config::ConfidenceConfig;

/// Fixed parameters of a search.
#[derive(Clone, Debug)]
pub struct SearchParams {
    /// Timely deltas collected before the walk stops.
    pub max_timely_deltas: usize,
    /// Confidence thresholds and watermarks.
    pub confidence: ConfidenceConfig,
}

/// What one search found and did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Timely deltas in the order they were found (newest history first).
    pub timely: Vec<i64>,
    /// History records skipped as untimely.
    pub untimely: usize,
    /// Statuses were regraded by this search.
    pub recomputed: bool,
    /// The confidence window restarted after this search.
    pub reset: bool,
}

/// Returns `true` if a prefetch issued at `issued` lands before `demand_cycle`.
#[inline]
pub const fn is_timely(issued: Cycle, latency: Cycle, demand_cycle: Cycle) -> bool {
    issued.saturating_add(latency) < demand_cycle
}

/// Learns timely deltas for `entry` from one demand.
///
/// # Arguments
///
/// * `entry` - The predictor to train.
/// * `latency` - Fill latency estimate in cycles.
/// * `demand_cycle` - Cycle at which the demand needed the data.
/// * `miss_line` - Line the demand needed.
/// * `params` - Search limits and confidence policy.
pub fn search_timely_deltas(
    entry: &mut HistoryEntry,
    latency: Cycle,
    demand_cycle: Cycle,
    miss_line: LineAddr,
    params: &SearchParams,
) -> SearchReport {
    trace!(latency, demand_cycle, %miss_line, "searching timely deltas");
    let mut report = SearchReport::default();

    for record in entry.history().iter().rev() {
        let delta = miss_line.delta_from(record.line);
        if !is_timely(record.timestamp, latency, demand_cycle) {
            trace!(
                timestamp = record.timestamp,
                latency,
                demand_cycle,
                delta,
                "skip untimely delta"
            );
            report.untimely += 1;
            continue;
        }
        if delta != 0 {
            trace!(delta, "timely delta found");
            report.timely.push(delta);
            if report.timely.len() >= params.max_timely_deltas {
                break;
            }
        }
    }

    entry.counter = entry.counter.saturating_add(1);

    for &delta in &report.timely {
        if let Observation::Replaced(old) = entry.deltas_mut().observe(delta) {
            trace!(delta, evicted = old.delta, "replaced delta");
        }
    }

    let confidence = &params.confidence;
    if entry.counter >= confidence.recompute_threshold {
        let counter = entry.counter;
        match entry.deltas_mut().grade(counter, confidence) {
            Some(best) => entry.set_best(best.delta, best.status),
            None => entry.set_best(0, DeltaStatus::NoPref),
        }
        report.recomputed = true;

        if entry.counter >= confidence.reset_threshold {
            entry.counter = 0;
            entry.deltas_mut().reset_coverage();
            report.reset = true;
        }
    }

    trace!(%entry, "delta table entry");
    report
}
