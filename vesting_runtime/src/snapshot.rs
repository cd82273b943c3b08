//! Snapshot layer: verifiable point-in-time copies of the ledger state.
//!
//! A snapshot carries the full state (strict serde encoding) plus the
//! canonical hash of that state. No timestamps in snapshot content.
//!
//! - `encode_state` / `decode_state`: LedgerState <-> JSON (strict, no defaults)
//! - `take_snapshot`:    state -> Snapshot
//! - `verify_snapshot`:  version + hash check without building an engine
//! - `restore_snapshot`: decode + invariant validation + hash check

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vesting_ledger::domain::{Day, LedgerState};
use vesting_ledger::hashing::canonical_hash;
use vesting_ledger::invariants::validate_invariants;
use vesting_ledger::LEDGER_VERSION;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("snapshot deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("snapshot is ledger v{got}, runtime expects v{expected}")]
    VersionMismatch { expected: u32, got: u32 },
    #[error("snapshot hash mismatch: recorded {recorded}, computed {computed}")]
    HashMismatch { recorded: String, computed: String },
    #[error("restored state violates invariants: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Journal sequence of the last call included.
    pub sequence: u64,
    /// Clock day when the snapshot was taken.
    pub day: Day,
    /// Strict serde encoding of the state.
    pub state_json: String,
    /// Canonical hash of the state.
    pub hash: String,
    pub ledger_version: u32,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

pub fn encode_state(state: &LedgerState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(SnapshotError::Serialization)
}

/// `deny_unknown_fields` on every state type rejects unexpected fields;
/// missing fields fail. No invariant validation here.
pub fn decode_state(json: &str) -> Result<LedgerState, SnapshotError> {
    serde_json::from_str(json).map_err(SnapshotError::Deserialization)
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

pub fn take_snapshot(sequence: u64, day: Day, state: &LedgerState) -> Result<Snapshot, SnapshotError> {
    Ok(Snapshot {
        sequence,
        day,
        state_json: encode_state(state)?,
        hash: canonical_hash(state),
        ledger_version: LEDGER_VERSION,
    })
}

fn check_version(snap: &Snapshot) -> Result<(), SnapshotError> {
    if snap.ledger_version != LEDGER_VERSION {
        return Err(SnapshotError::VersionMismatch {
            expected: LEDGER_VERSION,
            got: snap.ledger_version,
        });
    }
    Ok(())
}

fn check_hash(snap: &Snapshot, state: &LedgerState) -> Result<(), SnapshotError> {
    let computed = canonical_hash(state);
    if computed != snap.hash {
        return Err(SnapshotError::HashMismatch {
            recorded: snap.hash.clone(),
            computed,
        });
    }
    Ok(())
}

/// Version and hash consistency.
pub fn verify_snapshot(snap: &Snapshot) -> Result<(), SnapshotError> {
    check_version(snap)?;
    let state = decode_state(&snap.state_json)?;
    check_hash(snap, &state)
}

/// Safe entry point for loading state from a snapshot of unknown origin.
pub fn restore_snapshot(snap: &Snapshot) -> Result<LedgerState, SnapshotError> {
    check_version(snap)?;
    let state = decode_state(&snap.state_json)?;
    validate_invariants(&state).map_err(SnapshotError::InvariantViolation)?;
    check_hash(snap, &state)?;
    Ok(state)
}

pub fn to_json(snap: &Snapshot) -> Result<String, SnapshotError> {
    serde_json::to_string(snap).map_err(SnapshotError::Serialization)
}

pub fn from_json(json: &str) -> Result<Snapshot, SnapshotError> {
    serde_json::from_str(json).map_err(SnapshotError::Deserialization)
}
