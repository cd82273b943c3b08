#![forbid(unsafe_code)]

/// Ledger v1. Any change to canonical hashing or transition semantics bumps this.
pub const LEDGER_VERSION: u32 = 1;

pub mod arithmetic;
pub mod calls;
pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod invariants;
pub mod ledger;
pub mod registry;
pub mod roles;
pub mod state;
pub mod uniform;
pub mod vesting;

pub use engine::TokenEngine;
pub use error::{ErrorKind, LedgerError, LedgerResult};
