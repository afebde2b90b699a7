//! Redundant Prefetch Filter.
//!
//! A small set-associative record of recently issued prefetch lines. A request
//! for a line still present in the filter is dropped instead of being sent
//! again; the filter forgets lines through ordinary replacement, so a line can
//! be prefetched again once it has aged out.

use crate::common::{ConfigError, LineAddr};
use crate::config::FilterConfig;
use crate::core::units::table::{AssocTable, TableKey};

impl TableKey for LineAddr {
    fn set_hash(&self) -> u64 {
        self.0
    }
}

/// Recency filter over prefetch target lines.
#[derive(Debug)]
pub struct RedundantPrefetchFilter {
    table: AssocTable<LineAddr, ()>,
    block_shift: u32,
}

impl RedundantPrefetchFilter {
    /// Creates a filter with the configured shape.
    ///
    /// # Arguments
    ///
    /// * `config` - Filter capacity, associativity and replacement policy.
    /// * `block_shift` - log2 of the cache line size; addresses are compared by line.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the table shape is invalid.
    pub fn new(config: &FilterConfig, block_shift: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            table: AssocTable::new("prefetch filter", config.entries, config.ways, config.policy)?,
            block_shift,
        })
    }

    /// Returns `true` if the line holding `addr` was recently issued.
    pub fn contains(&self, addr: u64) -> bool {
        self.table
            .find(&LineAddr::from_byte(addr, self.block_shift))
            .is_some()
    }

    /// Records the line holding `addr` as issued.
    ///
    /// Re-inserting a present line refreshes its recency.
    pub fn insert(&mut self, addr: u64) {
        let line = LineAddr::from_byte(addr, self.block_shift);
        if let Some(slot) = self.table.find(&line) {
            self.table.touch(slot);
            return;
        }
        let slot = self.table.find_victim(&line);
        self.table.insert(line, slot);
    }

    /// Number of lines currently remembered.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no line is remembered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Maximum number of lines remembered.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }
}
