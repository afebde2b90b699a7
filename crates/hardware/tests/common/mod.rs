//! Shared builders and mocks.

use std::sync::{Arc, Mutex};

use berti_core::config::{Config, IssueMode};
use berti_core::core::units::table::policies::ReplacementPolicy;
use berti_core::{AccessInfo, BertiPrefetcher, FillInfo};

/// Line size used by every helper (64-byte lines).
pub const BLOCK_SHIFT: u32 = 6;

/// Installs a test-writer `tracing` subscriber once per process.
///
/// Run with `RUST_LOG=berti_core=trace` to see engine logs for a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default config with no fill latency bias, so latencies in tests are exact.
pub fn unbiased_config() -> Config {
    Config {
        fill_latency_bias: 0,
        ..Config::default()
    }
}

/// Builds an engine from [`unbiased_config`] with the given issue mode.
pub fn engine(mode: IssueMode) -> BertiPrefetcher {
    init_tracing();
    let mut config = unbiased_config();
    config.issue_mode = mode;
    BertiPrefetcher::new(&config).unwrap()
}

/// Byte address of the first byte of `line`.
pub const fn byte(line: u64) -> u64 {
    line << BLOCK_SHIFT
}

/// A non-secure demand access to `line`.
pub const fn access(pc: u64, line: u64, miss: bool, cycle: u64) -> AccessInfo {
    AccessInfo {
        pc,
        addr: byte(line),
        secure: false,
        miss,
        cycle,
    }
}

/// A non-secure demand fill for `line`, issued at `issue` and completed at `complete`.
pub const fn demand_fill(pc: u64, line: u64, issue: u64, complete: u64) -> FillInfo {
    FillInfo {
        pc: Some(pc),
        vaddr: Some(byte(line)),
        secure: false,
        issue_cycle: issue,
        complete_cycle: complete,
        is_prefetch: false,
        is_inst_fetch: false,
    }
}

/// One event observed by a [`ScriptedPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyEvent {
    Touch(usize, usize),
    Insert(usize, usize),
    Victim(usize),
}

/// Replacement policy that returns scripted victims and logs every call.
///
/// The log is shared so a test can keep a handle after boxing the policy into a
/// table.
#[derive(Debug, Default)]
pub struct ScriptedPolicy {
    victims: Vec<usize>,
    log: Arc<Mutex<Vec<PolicyEvent>>>,
}

impl ScriptedPolicy {
    /// Creates a policy returning `victims` in order, then way 0 forever.
    pub fn new(victims: &[usize]) -> Self {
        let mut victims = victims.to_vec();
        victims.reverse();
        Self {
            victims,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the event log.
    pub fn log(&self) -> Arc<Mutex<Vec<PolicyEvent>>> {
        Arc::clone(&self.log)
    }

    fn record(&self, event: PolicyEvent) {
        self.log.lock().unwrap().push(event);
    }
}

impl ReplacementPolicy for ScriptedPolicy {
    fn touch(&mut self, set: usize, way: usize) {
        self.record(PolicyEvent::Touch(set, way));
    }

    fn insert(&mut self, set: usize, way: usize) {
        self.record(PolicyEvent::Insert(set, way));
    }

    fn victim(&mut self, set: usize) -> usize {
        self.record(PolicyEvent::Victim(set));
        self.victims.pop().unwrap_or(0)
    }
}
