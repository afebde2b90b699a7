//! Configuration system for the prefetch engine.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the Berti prefetcher. It provides:
//! 1. **Defaults:** Baseline sizes for the history table, delta sets, and recency filter.
//! 2. **Structures:** Hierarchical config for the history table, filter, and confidence policy.
//! 3. **Enums:** Replacement policy and issue mode selectors.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.
//! Every value is fixed at construction; [`Config::validate`] rejects shapes the engine
//! cannot be built with.

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants for the prefetcher.
mod defaults {
    /// History table entries.
    pub const HISTORY_ENTRIES: usize = 64;

    /// History table associativity.
    pub const HISTORY_WAYS: usize = 8;

    /// Access records kept per history entry.
    pub const MAX_HISTORY: usize = 16;

    /// Delta candidates per history entry.
    pub const DELTA_SLOTS: usize = 6;

    /// Timely deltas gathered by one search before it stops.
    pub const MAX_TIMELY_DELTAS: usize = 6;

    /// Recency filter entries.
    pub const FILTER_ENTRIES: usize = 128;

    /// Recency filter associativity.
    pub const FILTER_WAYS: usize = 8;

    /// Searches after which delta statuses are recomputed.
    pub const RECOMPUTE_THRESHOLD: u32 = 6;

    /// Searches after which coverage counters are cleared.
    pub const RESET_THRESHOLD: u32 = 16;

    /// Coverage (percent of searches) needed for L1 prefetching.
    pub const L1_COVERAGE_PERCENT: u32 = 65;

    /// Coverage (percent of searches) needed for L2 prefetching.
    pub const L2_COVERAGE_PERCENT: u32 = 35;

    /// Cache line size in bytes.
    pub const BLOCK_BYTES: usize = 64;

    /// Cycles added to every measured fill latency.
    ///
    /// Covers the pipeline stages between the fill arriving at the cache and the
    /// load consuming it.
    pub const FILL_LATENCY_BIAS: u64 = 20;
}

/// Replacement policy used by an associative table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Single-bit pseudo-LRU.
    #[serde(alias = "Plru")]
    Plru,
    /// First In First Out (insertion order, ignores touches).
    #[serde(alias = "Fifo")]
    Fifo,
    /// Pseudo-random victim selection.
    #[serde(alias = "Random")]
    Random,
    /// Most Recently Used.
    #[serde(alias = "Mru")]
    Mru,
}

/// How a matched predictor turns its delta set into prefetch requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IssueMode {
    /// Issue only the entry's best delta.
    #[default]
    Conservative,
    /// Issue every delta whose status allows prefetching.
    Aggressive,
}

/// Root configuration structure for the prefetcher.
///
/// # Examples
///
/// ```
/// use berti_core::config::{Config, IssueMode};
///
/// let config = Config::default();
/// assert_eq!(config.issue_mode, IssueMode::Conservative);
/// assert_eq!(config.history.entries, 64);
/// ```
///
/// Deserializing from JSON; omitted fields keep their defaults:
///
/// ```
/// use berti_core::config::{Config, IssueMode, ReplacementPolicy};
///
/// let json = r#"{
///     "issue_mode": "Aggressive",
///     "block_bytes": 64,
///     "history": { "entries": 32, "ways": 4, "policy": "Fifo" },
///     "filter": { "entries": 64 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.issue_mode, IssueMode::Aggressive);
/// assert_eq!(config.history.policy, ReplacementPolicy::Fifo);
/// assert_eq!(config.history.max_history, 16);
/// assert_eq!(config.filter.ways, 8);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// History table shape and per-entry capacities.
    #[serde(default)]
    pub history: HistoryTableConfig,

    /// Redundant prefetch filter shape.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Confidence promotion and reset policy.
    #[serde(default)]
    pub confidence: ConfidenceConfig,

    /// Issue mode for matched predictors.
    #[serde(default)]
    pub issue_mode: IssueMode,

    /// Cache line size in bytes (power of two).
    #[serde(default = "Config::default_block_bytes")]
    pub block_bytes: usize,

    /// Cycles added to each measured fill latency.
    #[serde(default = "Config::default_fill_latency_bias")]
    pub fill_latency_bias: u64,
}

impl Config {
    /// Returns the default cache line size.
    fn default_block_bytes() -> usize {
        defaults::BLOCK_BYTES
    }

    /// Returns the default fill latency bias.
    fn default_fill_latency_bias() -> u64 {
        defaults::FILL_LATENCY_BIAS
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation error
    /// reported by [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// log2 of the cache line size.
    ///
    /// Only meaningful once [`Config::validate`] has accepted `block_bytes`.
    pub const fn block_shift(&self) -> u32 {
        self.block_bytes.trailing_zeros()
    }

    /// Checks every structural constraint the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_table("history table", self.history.entries, self.history.ways)?;
        check_table("prefetch filter", self.filter.entries, self.filter.ways)?;

        if self.history.max_history == 0 {
            return Err(ConfigError::ZeroSize {
                field: "history.max_history",
            });
        }
        if self.history.delta_slots == 0 {
            return Err(ConfigError::ZeroSize {
                field: "history.delta_slots",
            });
        }
        if self.history.max_timely_deltas == 0 {
            return Err(ConfigError::ZeroSize {
                field: "history.max_timely_deltas",
            });
        }
        if self.block_bytes == 0 || !self.block_bytes.is_power_of_two() {
            return Err(ConfigError::BlockSize(self.block_bytes));
        }
        self.confidence.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history: HistoryTableConfig::default(),
            filter: FilterConfig::default(),
            confidence: ConfidenceConfig::default(),
            issue_mode: IssueMode::default(),
            block_bytes: defaults::BLOCK_BYTES,
            fill_latency_bias: defaults::FILL_LATENCY_BIAS,
        }
    }
}

/// Rejects a table shape with no capacity or a partial set.
fn check_table(table: &'static str, entries: usize, ways: usize) -> Result<(), ConfigError> {
    if entries == 0 || ways == 0 {
        return Err(ConfigError::ZeroCapacity {
            table,
            entries,
            ways,
        });
    }
    if entries % ways != 0 {
        return Err(ConfigError::UnevenSets {
            table,
            entries,
            ways,
        });
    }
    Ok(())
}

/// History table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTableConfig {
    /// Total number of entries.
    #[serde(default = "HistoryTableConfig::default_entries")]
    pub entries: usize,

    /// Associativity (ways per set).
    #[serde(default = "HistoryTableConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy among the ways of a set.
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Access records kept per entry.
    #[serde(default = "HistoryTableConfig::default_max_history")]
    pub max_history: usize,

    /// Delta candidates kept per entry.
    #[serde(default = "HistoryTableConfig::default_delta_slots")]
    pub delta_slots: usize,

    /// Timely deltas one search collects before stopping.
    #[serde(default = "HistoryTableConfig::default_max_timely_deltas")]
    pub max_timely_deltas: usize,
}

impl HistoryTableConfig {
    fn default_entries() -> usize {
        defaults::HISTORY_ENTRIES
    }

    fn default_ways() -> usize {
        defaults::HISTORY_WAYS
    }

    fn default_max_history() -> usize {
        defaults::MAX_HISTORY
    }

    fn default_delta_slots() -> usize {
        defaults::DELTA_SLOTS
    }

    fn default_max_timely_deltas() -> usize {
        defaults::MAX_TIMELY_DELTAS
    }
}

impl Default for HistoryTableConfig {
    fn default() -> Self {
        Self {
            entries: defaults::HISTORY_ENTRIES,
            ways: defaults::HISTORY_WAYS,
            policy: ReplacementPolicy::default(),
            max_history: defaults::MAX_HISTORY,
            delta_slots: defaults::DELTA_SLOTS,
            max_timely_deltas: defaults::MAX_TIMELY_DELTAS,
        }
    }
}

/// Redundant prefetch filter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Total number of remembered prefetch addresses.
    #[serde(default = "FilterConfig::default_entries")]
    pub entries: usize,

    /// Associativity (ways per set).
    #[serde(default = "FilterConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy among the ways of a set.
    #[serde(default)]
    pub policy: ReplacementPolicy,
}

impl FilterConfig {
    fn default_entries() -> usize {
        defaults::FILTER_ENTRIES
    }

    fn default_ways() -> usize {
        defaults::FILTER_WAYS
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            entries: defaults::FILTER_ENTRIES,
            ways: defaults::FILTER_WAYS,
            policy: ReplacementPolicy::default(),
        }
    }
}

/// Confidence policy applied by the timely-delta search.
///
/// Once an entry has seen `recompute_threshold` searches, each delta is graded by
/// its coverage relative to the number of searches: at least `l1_coverage_percent`
/// allows L1 prefetching, at least `l2_coverage_percent` allows L2 prefetching.
/// At `reset_threshold` searches the coverage window restarts.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceConfig {
    /// Searches before statuses are recomputed.
    #[serde(default = "ConfidenceConfig::default_recompute")]
    pub recompute_threshold: u32,

    /// Searches before coverage counters are cleared.
    #[serde(default = "ConfidenceConfig::default_reset")]
    pub reset_threshold: u32,

    /// L1 promotion watermark in percent.
    #[serde(default = "ConfidenceConfig::default_l1")]
    pub l1_coverage_percent: u32,

    /// L2 promotion watermark in percent.
    #[serde(default = "ConfidenceConfig::default_l2")]
    pub l2_coverage_percent: u32,
}

impl ConfidenceConfig {
    fn default_recompute() -> u32 {
        defaults::RECOMPUTE_THRESHOLD
    }

    fn default_reset() -> u32 {
        defaults::RESET_THRESHOLD
    }

    fn default_l1() -> u32 {
        defaults::L1_COVERAGE_PERCENT
    }

    fn default_l2() -> u32 {
        defaults::L2_COVERAGE_PERCENT
    }

    /// Checks threshold ordering and watermark ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroSize`], [`ConfigError::ThresholdOrder`] or
    /// [`ConfigError::Watermarks`].
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.recompute_threshold == 0 {
            return Err(ConfigError::ZeroSize {
                field: "confidence.recompute_threshold",
            });
        }
        if self.reset_threshold < self.recompute_threshold {
            return Err(ConfigError::ThresholdOrder {
                recompute: self.recompute_threshold,
                reset: self.reset_threshold,
            });
        }
        if self.l1_coverage_percent > 100 || self.l2_coverage_percent > self.l1_coverage_percent {
            return Err(ConfigError::Watermarks {
                l1: self.l1_coverage_percent,
                l2: self.l2_coverage_percent,
            });
        }
        Ok(())
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            recompute_threshold: defaults::RECOMPUTE_THRESHOLD,
            reset_threshold: defaults::RESET_THRESHOLD,
            l1_coverage_percent: defaults::L1_COVERAGE_PERCENT,
            l2_coverage_percent: defaults::L2_COVERAGE_PERCENT,
        }
    }
}
