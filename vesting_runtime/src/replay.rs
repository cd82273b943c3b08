//! Replay orchestrator: rebuild ledger state from the call journal.
//!
//! Every entry is re-executed through the kernel at its recorded day.
//! The journal holds accepted calls only, so any rejection during replay
//! means the journal and the kernel disagree.

use thiserror::Error;

use vesting_ledger::calls::CallEnvelope;
use vesting_ledger::clock::ManualClock;
use vesting_ledger::config::TokenConfig;
use vesting_ledger::domain::LedgerState;
use vesting_ledger::hashing::canonical_hash;
use vesting_ledger::{LedgerError, TokenEngine};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("journal entry {sequence} ({op}) rejected on replay: {source}")]
    Rejected {
        sequence: u64,
        op: &'static str,
        #[source]
        source: LedgerError,
    },
}

/// Re-executes `entries` on an existing engine, advancing `clock` to each
/// entry's day first.
pub fn replay_onto(
    engine: &mut TokenEngine,
    clock: &ManualClock,
    entries: &[CallEnvelope],
) -> Result<(), ReplayError> {
    for entry in entries {
        clock.advance_to(entry.day);
        engine
            .execute(&entry.caller, &entry.call)
            .map_err(|source| ReplayError::Rejected {
                sequence: entry.sequence,
                op: entry.call.name(),
                source,
            })?;
    }
    Ok(())
}

/// Fresh engine from `config` with every entry applied. The returned clock
/// drives the engine and sits on the last entry's day.
pub fn rebuild_engine(
    config: &TokenConfig,
    entries: &[CallEnvelope],
) -> Result<(TokenEngine, ManualClock), ReplayError> {
    let clock = ManualClock::new(entries.first().map(|e| e.day).unwrap_or(0));
    let mut engine = TokenEngine::new(config, clock.clone());
    replay_onto(&mut engine, &clock, entries)?;
    Ok((engine, clock))
}

/// Rebuild and return `(final_state, canonical_hash)`.
pub fn rebuild_state(
    config: &TokenConfig,
    entries: &[CallEnvelope],
) -> Result<(LedgerState, String), ReplayError> {
    let (engine, _) = rebuild_engine(config, entries)?;
    let state = engine.state().clone();
    let hash = canonical_hash(&state);
    Ok((state, hash))
}

pub fn rebuild_hash(config: &TokenConfig, entries: &[CallEnvelope]) -> Result<String, ReplayError> {
    rebuild_state(config, entries).map(|(_, hash)| hash)
}
