//! Berti prefetcher trace replay CLI.
//!
//! This binary drives the prefetcher from a recorded cache event trace. It performs:
//! 1. **Configuration:** Built-in defaults, or a JSON config file (`--config`), with an optional `--aggressive` override.
//! 2. **Replay:** Reads a JSON-lines trace where every line is an `access` or a `fill` event and feeds it to the engine.
//! 3. **Reporting:** Prints one line per emitted prefetch and a statistics summary (text or JSON).
//!
//! Engine logs go to stderr and are filtered with `RUST_LOG` (e.g. `RUST_LOG=berti_core=debug`).

use std::error::Error;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use berti_core::config::{Config, IssueMode};
use berti_core::{AccessInfo, BertiPrefetcher, FillInfo};

#[derive(Parser, Debug)]
#[command(
    name = "berti-replay",
    author,
    version,
    about = "Replay a cache event trace through the Berti prefetcher",
    long_about = "Replay a JSON-lines cache event trace through the Berti timely-delta prefetcher.\n\nEach trace line is one event:\n  {\"event\":\"access\",\"pc\":4096,\"addr\":6400,\"miss\":true,\"cycle\":0}\n  {\"event\":\"fill\",\"pc\":4096,\"vaddr\":6720,\"issue_cycle\":5,\"complete_cycle\":90}\n\nExamples:\n  berti-replay --trace run.jsonl\n  berti-replay --trace run.jsonl --config berti.json --aggressive\n  RUST_LOG=berti_core=debug berti-replay --trace run.jsonl --stats-json"
)]
struct Cli {
    /// JSON-lines trace of access and fill events.
    #[arg(short, long)]
    trace: PathBuf,

    /// JSON prefetcher configuration (defaults when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Issue every promoted delta instead of only the best one.
    #[arg(long)]
    aggressive: bool,

    /// Print statistics as JSON instead of the text summary.
    #[arg(long)]
    stats_json: bool,

    /// Statistics sections to print (training, fills, issue, table); all when empty.
    #[arg(long, value_delimiter = ',')]
    sections: Vec<String>,

    /// Do not print individual prefetch requests.
    #[arg(short, long)]
    quiet: bool,
}

/// One line of the trace.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum TraceEvent {
    /// A demand access reaching the cache.
    Access {
        pc: u64,
        addr: u64,
        #[serde(default)]
        secure: bool,
        #[serde(default)]
        miss: bool,
        cycle: u64,
    },
    /// A fill completing in the cache.
    Fill {
        #[serde(default)]
        pc: Option<u64>,
        #[serde(default)]
        vaddr: Option<u64>,
        #[serde(default)]
        secure: bool,
        issue_cycle: u64,
        complete_cycle: u64,
        #[serde(default)]
        prefetch: bool,
        #[serde(default)]
        inst_fetch: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Loads the configuration, replays the trace and prints the results.
fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("reading config {}: {e}", path.display()))?;
            Config::from_json(&text)?
        }
        None => Config::default(),
    };
    if cli.aggressive {
        config.issue_mode = IssueMode::Aggressive;
    }

    let mut prefetcher = BertiPrefetcher::new(&config)?;
    info!(
        issue_mode = ?config.issue_mode,
        history_entries = config.history.entries,
        filter_entries = config.filter.entries,
        "prefetcher configured"
    );

    let file = File::open(&cli.trace)
        .map_err(|e| format!("opening trace {}: {e}", cli.trace.display()))?;
    let mut events = 0u64;
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: TraceEvent = serde_json::from_str(&line)
            .map_err(|e| format!("{}:{}: {e}", cli.trace.display(), lineno + 1))?;
        replay_event(&mut prefetcher, &event, cli.quiet);
        events += 1;
    }
    info!(events, "trace replayed");

    if cli.stats_json {
        println!("{}", serde_json::to_string_pretty(prefetcher.stats())?);
    } else {
        prefetcher.stats().print_sections(&cli.sections);
    }
    Ok(())
}

/// Feeds one trace event to the prefetcher, printing any requests it emits.
fn replay_event(prefetcher: &mut BertiPrefetcher, event: &TraceEvent, quiet: bool) {
    match *event {
        TraceEvent::Access {
            pc,
            addr,
            secure,
            miss,
            cycle,
        } => {
            let requests = prefetcher.on_access(&AccessInfo {
                pc,
                addr,
                secure,
                miss,
                cycle,
            });
            if quiet {
                return;
            }
            for req in requests {
                println!(
                    "{cycle:>10} pc={pc:#x} addr={addr:#x} -> prefetch {:#x} prio={} src={:?}",
                    req.addr, req.priority, req.source
                );
            }
        }
        TraceEvent::Fill {
            pc,
            vaddr,
            secure,
            issue_cycle,
            complete_cycle,
            prefetch,
            inst_fetch,
        } => prefetcher.on_fill(&FillInfo {
            pc,
            vaddr,
            secure,
            issue_cycle,
            complete_cycle,
            is_prefetch: prefetch,
            is_inst_fetch: inst_fetch,
        }),
    }
}
