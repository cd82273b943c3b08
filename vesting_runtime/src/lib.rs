#![forbid(unsafe_code)]

//! VestingLedger v1: Host Runtime
//!
//! Wraps the ledger kernel with a serialized session, an append-only call
//! journal, replay, snapshots and drift detection.
//!
//! No domain logic lives here. All transitions and invariants are
//! delegated to the kernel.

pub mod drift;
pub mod journal;
pub mod replay;
pub mod session;
pub mod snapshot;
