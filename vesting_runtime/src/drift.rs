//! Drift detection: determinism verification and state comparison.
//!
//! Amounts are reported as before/after pairs; no signed or float deltas.

use std::collections::BTreeSet;

use thiserror::Error;

use vesting_ledger::calls::CallEnvelope;
use vesting_ledger::config::TokenConfig;
use vesting_ledger::domain::{AccountId, Amount, LedgerState};
use vesting_ledger::hashing::canonical_hash;

use crate::replay::{self, ReplayError};

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("determinism failure: run 1 hashed {first}, run 2 hashed {second}")]
    Diverged { first: String, second: String },
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// Replays the same journal twice and requires identical hashes.
/// Returns the agreed hash.
pub fn verify_determinism(config: &TokenConfig, entries: &[CallEnvelope]) -> Result<String, DriftError> {
    let first = replay::rebuild_hash(config, entries)?;
    let second = replay::rebuild_hash(config, entries)?;
    if first != second {
        return Err(DriftError::Diverged { first, second });
    }
    Ok(first)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub account: AccountId,
    pub before: Amount,
    pub after: Amount,
}

/// Structured comparison of two ledger states, `a` before `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub hash_a: String,
    pub hash_b: String,
    pub supply_a: Amount,
    pub supply_b: Amount,
    /// Accounts whose balance differs, in key order.
    pub balance_changes: Vec<BalanceChange>,
    /// Accounts holding an active grant in `b` that they did not hold in `a`.
    pub grants_opened: Vec<AccountId>,
    /// Accounts whose grant was active in `a` and is revoked in `b`.
    pub grants_revoked: Vec<AccountId>,
    pub owner_a: AccountId,
    pub owner_b: AccountId,
    pub paused_a: bool,
    pub paused_b: bool,
}

impl DriftReport {
    pub fn is_identical(&self) -> bool {
        self.hash_a == self.hash_b
    }

    /// Tokens burned between `a` and `b`. Supply never grows.
    pub fn burned(&self) -> Amount {
        self.supply_a.saturating_sub(self.supply_b)
    }
}

pub fn compare_states(a: &LedgerState, b: &LedgerState) -> DriftReport {
    let ids: BTreeSet<&str> = a
        .accounts
        .keys()
        .chain(b.accounts.keys())
        .map(|s| s.as_str())
        .collect();

    let mut balance_changes = Vec::new();
    let mut grants_opened = Vec::new();
    let mut grants_revoked = Vec::new();
    for id in ids {
        let (before, after) = (a.balance_of(id), b.balance_of(id));
        if before != after {
            balance_changes.push(BalanceChange {
                account: id.to_string(),
                before,
                after,
            });
        }

        let grant_a = a.grant_of(id);
        let grant_b = b.grant_of(id);
        let active_a = grant_a.map(|g| g.is_active).unwrap_or(false);
        let active_b = grant_b.map(|g| g.is_active).unwrap_or(false);
        if active_b && (!active_a || grant_a != grant_b) {
            grants_opened.push(id.to_string());
        }
        if active_a && grant_b.map(|g| g.was_revoked).unwrap_or(false) {
            grants_revoked.push(id.to_string());
        }
    }

    DriftReport {
        hash_a: canonical_hash(a),
        hash_b: canonical_hash(b),
        supply_a: a.total_supply,
        supply_b: b.total_supply,
        balance_changes,
        grants_opened,
        grants_revoked,
        owner_a: a.roles.owner.clone(),
        owner_b: b.roles.owner.clone(),
        paused_a: a.paused,
        paused_b: b.paused,
    }
}
