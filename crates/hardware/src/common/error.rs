//! Configuration error definitions.
//!
//! The prefetch engine is advisory and has no runtime failure modes: malformed
//! fills are ignored, overflow is resolved by eviction and duplicate requests are
//! filtered. The only hard failures happen while building the engine from a
//! configuration, and they are reported through [`ConfigError`].

use thiserror::Error;

/// Errors raised while validating a configuration or constructing a table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A table was configured with no entries or no ways.
    #[error("{table}: capacity must be non-zero (entries = {entries}, ways = {ways})")]
    ZeroCapacity {
        /// Name of the offending table.
        table: &'static str,
        /// Configured entry count.
        entries: usize,
        /// Configured associativity.
        ways: usize,
    },

    /// The entry count is not a whole number of sets.
    #[error("{table}: {entries} entries is not a multiple of associativity {ways}")]
    UnevenSets {
        /// Name of the offending table.
        table: &'static str,
        /// Configured entry count.
        entries: usize,
        /// Configured associativity.
        ways: usize,
    },

    /// A size field that must be non-zero was zero.
    #[error("{field} must be non-zero")]
    ZeroSize {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The cache line size is not a power of two.
    #[error("block size {0} bytes is not a power of two")]
    BlockSize(usize),

    /// The confidence reset threshold precedes the recompute threshold.
    #[error("reset threshold {reset} must not be below recompute threshold {recompute}")]
    ThresholdOrder {
        /// Configured recompute threshold.
        recompute: u32,
        /// Configured reset threshold.
        reset: u32,
    },

    /// A coverage percentage is out of range or the L1 watermark is below L2.
    #[error("coverage watermarks must satisfy l2 <= l1 <= 100 (l1 = {l1}, l2 = {l2})")]
    Watermarks {
        /// L1 promotion watermark in percent.
        l1: u32,
        /// L2 promotion watermark in percent.
        l2: u32,
    },

    /// The configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}
