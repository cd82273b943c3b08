//! VestingLedger v1: Scenario Runner
//!
//! Loads a scenario (config plus an ordered list of call envelopes), replays
//! it twice through fresh engines on a manual clock, and prints each
//! outcome together with the final canonical hash.
//!
//! Usage: `vesting_ledger [scenario.json]`. Log level via `RUST_LOG`.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vesting_ledger::calls::CallEnvelope;
use vesting_ledger::clock::ManualClock;
use vesting_ledger::config::TokenConfig;
use vesting_ledger::hashing::canonical_hash;
use vesting_ledger::TokenEngine;

const DEFAULT_PATHS: [&str; 3] = [
    "scenario.json",
    "../scenario.json",
    "vesting_ledger/scenario.json",
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    #[serde(default)]
    config: TokenConfig,
    /// Day the clock starts on; defaults to the first envelope's day.
    start_day: Option<u32>,
    calls: Vec<CallEnvelope>,
    /// Optional pinned result. A mismatch fails the run.
    expected_hash: Option<String>,
}

struct RunOutcome {
    hash: String,
    accepted: usize,
    rejected: usize,
}

fn run(scenario: &Scenario, verbose: bool) -> RunOutcome {
    let start = scenario
        .start_day
        .or_else(|| scenario.calls.first().map(|c| c.day))
        .unwrap_or(0);
    let clock = ManualClock::new(start);
    let mut engine = TokenEngine::new(&scenario.config, clock.clone());
    let (mut accepted, mut rejected) = (0, 0);

    for envelope in &scenario.calls {
        clock.advance_to(envelope.day);
        match engine.execute(&envelope.caller, &envelope.call) {
            Ok(()) => {
                accepted += 1;
                if verbose {
                    println!(
                        "[OK]   #{} day={} {} by {}",
                        envelope.sequence,
                        envelope.day,
                        envelope.call.name(),
                        envelope.caller
                    );
                }
            }
            Err(e) => {
                rejected += 1;
                if verbose {
                    println!(
                        "[FAIL] #{} day={} {} by {}: {}",
                        envelope.sequence,
                        envelope.day,
                        envelope.call.name(),
                        envelope.caller,
                        e
                    );
                }
            }
        }
    }

    RunOutcome {
        hash: canonical_hash(engine.state()),
        accepted,
        rejected,
    }
}

fn load(arg: Option<String>) -> Result<(String, Scenario), String> {
    let path = match arg {
        Some(p) => p,
        None => DEFAULT_PATHS
            .iter()
            .find(|p| Path::new(p).exists())
            .map(|p| p.to_string())
            .ok_or_else(|| "no scenario file given and none found".to_string())?,
    };
    let text = fs::read_to_string(&path).map_err(|e| format!("{}: {}", path, e))?;
    let scenario = serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))?;
    Ok((path, scenario))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (path, scenario) = match load(std::env::args().nth(1)) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = scenario.config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    info!(path = %path, calls = scenario.calls.len(), "scenario loaded");

    let first = run(&scenario, true);
    let second = run(&scenario, false);

    println!("\n===========================================");
    println!(
        "accepted={} rejected={} hash={}",
        first.accepted, first.rejected, first.hash
    );

    let mut ok = true;
    if first.hash != second.hash {
        println!("[FAIL] Determinism: run1={} run2={}", first.hash, second.hash);
        ok = false;
    }
    if let Some(expected) = &scenario.expected_hash {
        if *expected != first.hash {
            println!("[FAIL] Hash mismatch: got={} expected={}", first.hash, expected);
            ok = false;
        }
    }

    if ok {
        println!("[OK] Scenario replayed deterministically.");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
