//! VestingLedger v1: Core Domain Types
//!
//! Pure data. Transition logic lives in the component modules.
//! All amounts: u128 fixed-point (18 decimals). All dates: integer days.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Opaque caller identity assigned by the host.
pub type AccountId = String;

/// Token amount in the smallest indivisible unit.
pub type Amount = u128;

/// Day number since the Unix epoch.
pub type Day = u32;

// ── Grants ─────────────────────────────────────────────────────────

/// Shape of a vesting curve, independent of amounts and start day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VestingSchedule {
    pub duration: Day,
    pub cliff_duration: Day,
    pub interval: Day,
    pub is_revocable: bool,
}

/// A vesting overlay on part of a beneficiary's balance.
///
/// Stored on the beneficiary's `Account`; at most one per account. Never
/// deleted: revocation flips `is_active` off and `was_revoked` on so later
/// queries can still report what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    /// Issuer that funded the grant and receives revoked tokens.
    pub grantor: AccountId,
    pub total_amount: Amount,
    pub vesting_amount: Amount,
    pub start_day: Day,
    pub schedule: VestingSchedule,
    pub is_active: bool,
    pub was_revoked: bool,
}

impl Grant {
    /// First day on which the whole vesting amount is vested.
    pub fn fully_vested_day(&self) -> Day {
        self.start_day.saturating_add(self.schedule.duration)
    }
}

/// Result tuple of the vesting queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingStatus {
    pub vested: Amount,
    pub not_vested: Amount,
    pub vesting_amount: Amount,
    pub start_day: Day,
    pub duration: Day,
    pub cliff_duration: Day,
    pub interval: Day,
    pub is_active: bool,
    pub was_revoked: bool,
}

// ── Accounts ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    pub balance: Amount,
    pub registered: bool,
    pub display_name: Option<String>,
    /// spender -> approved amount. Zero allowances are not stored.
    pub allowances: BTreeMap<AccountId, Amount>,
    pub grant: Option<Grant>,
}

// ── Roles ──────────────────────────────────────────────────────────

/// Issuance window imposed on a uniform grantor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantorRestrictions {
    pub min_start_day: Day,
    pub max_start_day: Day,
    /// Issuance must happen strictly before this day.
    pub expiration_day: Day,
}

/// Owner-imposed configuration of a uniform grantor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniformGrantorConfig {
    pub restrictions: Option<GrantorRestrictions>,
    /// Set exactly once.
    pub schedule: Option<VestingSchedule>,
}

impl UniformGrantorConfig {
    /// Window and schedule, once both have been set.
    pub fn ready_terms(&self) -> Option<(GrantorRestrictions, VestingSchedule)> {
        self.restrictions.zip(self.schedule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum GrantorRole {
    /// May issue any schedule through `grant_vesting_tokens`.
    Standard,
    /// Bound to one fixed schedule and an issuance window.
    Uniform(UniformGrantorConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleState {
    pub owner: AccountId,
    pub grantors: BTreeMap<AccountId, GrantorRole>,
    pub pausers: BTreeSet<AccountId>,
    /// Every uniform schedule ever set, by grantor. Entries are never
    /// removed, so removing and re-adding a grantor cannot reopen it.
    pub uniform_schedules: BTreeMap<AccountId, VestingSchedule>,
}

// ── Global ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Complete ledger state. Owned exclusively by one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerState {
    pub token: TokenInfo,
    pub accounts: BTreeMap<AccountId, Account>,
    pub total_supply: Amount,
    pub roles: RoleState,
    pub paused: bool,
    /// Terminal. Once set no operation succeeds.
    pub killed: bool,
}

impl LedgerState {
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Mutable access, creating an empty unregistered account on first touch.
    pub fn account_mut(&mut self, id: &str) -> &mut Account {
        self.accounts.entry(id.to_string()).or_default()
    }

    pub fn balance_of(&self, id: &str) -> Amount {
        self.account(id).map(|a| a.balance).unwrap_or(0)
    }

    pub fn grant_of(&self, id: &str) -> Option<&Grant> {
        self.account(id).and_then(|a| a.grant.as_ref())
    }
}
