//! VestingLedger v1: Role Manager
//!
//! One owner, a grantor map and a pauser set. Membership queries report the
//! explicit entries; authorization checks additionally accept the current
//! owner, who always holds grantor and pauser privileges.

use tracing::info;

use crate::domain::{GrantorRole, LedgerState, UniformGrantorConfig};
use crate::error::{LedgerError, LedgerResult};
use crate::registry::require_registered;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn is_owner(state: &LedgerState, who: &str) -> bool {
    state.roles.owner == who
}

pub fn is_grantor(state: &LedgerState, who: &str) -> bool {
    state.roles.grantors.contains_key(who)
}

pub fn is_uniform_grantor(state: &LedgerState, who: &str) -> bool {
    matches!(state.roles.grantors.get(who), Some(GrantorRole::Uniform(_)))
}

pub fn is_pauser(state: &LedgerState, who: &str) -> bool {
    state.roles.pausers.contains(who)
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

pub fn require_owner(state: &LedgerState, caller: &str) -> LedgerResult<()> {
    if !is_owner(state, caller) {
        return Err(LedgerError::NotAuthorized("caller is not the owner"));
    }
    Ok(())
}

/// Owner or a standard grantor. Uniform grantors issue through their own
/// restricted entry points only.
pub fn require_standard_grantor(state: &LedgerState, caller: &str) -> LedgerResult<()> {
    if is_owner(state, caller) {
        return Ok(());
    }
    match state.roles.grantors.get(caller) {
        Some(GrantorRole::Standard) => Ok(()),
        Some(GrantorRole::Uniform(_)) => Err(LedgerError::NotAuthorized(
            "uniform grantors must use the uniform grant operations",
        )),
        None => Err(LedgerError::NotAuthorized("caller is not a grantor")),
    }
}

pub fn require_pauser(state: &LedgerState, caller: &str) -> LedgerResult<()> {
    if !is_owner(state, caller) && !is_pauser(state, caller) {
        return Err(LedgerError::NotAuthorized("caller is not a pauser"));
    }
    Ok(())
}

pub fn require_not_paused(state: &LedgerState) -> LedgerResult<()> {
    if state.paused {
        return Err(LedgerError::Paused);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// Hands ownership to a registered account. The outgoing owner's explicit
/// grantor and pauser entries move to the incoming owner, who may later
/// drop them without losing the implicit owner privilege. A grantor entry
/// the incoming owner already holds is kept.
pub fn transfer_ownership(
    state: &mut LedgerState,
    caller: &str,
    new_owner: &str,
) -> LedgerResult<()> {
    require_owner(state, caller)?;
    require_registered(state, new_owner)?;

    let roles = &mut state.roles;
    let old_owner = std::mem::replace(&mut roles.owner, new_owner.to_string());
    if old_owner != new_owner {
        roles.grantors.remove(&old_owner);
        roles.pausers.remove(&old_owner);
        roles
            .grantors
            .entry(new_owner.to_string())
            .or_insert(GrantorRole::Standard);
        roles.pausers.insert(new_owner.to_string());
    }

    info!(from = %old_owner, to = %new_owner, "ownership transferred");
    Ok(())
}

pub fn renounce_ownership(state: &LedgerState, caller: &str) -> LedgerResult<()> {
    require_owner(state, caller)?;
    Err(LedgerError::NotAuthorized("ownership cannot be renounced"))
}

// ---------------------------------------------------------------------------
// Grantors and pausers
// ---------------------------------------------------------------------------

/// Adds or re-flags a grantor. An existing uniform configuration is kept,
/// and a uniform schedule set earlier is reattached: it can never be
/// replaced.
pub fn add_grantor(
    state: &mut LedgerState,
    caller: &str,
    account: &str,
    uniform: bool,
) -> LedgerResult<()> {
    require_owner(state, caller)?;
    let roles = &mut state.roles;
    let role = match (uniform, roles.grantors.get(account)) {
        (true, Some(GrantorRole::Uniform(config))) => GrantorRole::Uniform(*config),
        (true, _) => GrantorRole::Uniform(UniformGrantorConfig {
            restrictions: None,
            schedule: roles.uniform_schedules.get(account).copied(),
        }),
        (false, _) => GrantorRole::Standard,
    };
    roles.grantors.insert(account.to_string(), role);
    info!(account, uniform, "grantor added");
    Ok(())
}

/// Removing the last grantor, including the owner's own entry, is allowed.
pub fn remove_grantor(state: &mut LedgerState, caller: &str, account: &str) -> LedgerResult<()> {
    require_owner(state, caller)?;
    state.roles.grantors.remove(account);
    info!(account, "grantor removed");
    Ok(())
}

pub fn add_pauser(state: &mut LedgerState, caller: &str, account: &str) -> LedgerResult<()> {
    require_owner(state, caller)?;
    state.roles.pausers.insert(account.to_string());
    info!(account, "pauser added");
    Ok(())
}

pub fn remove_pauser(state: &mut LedgerState, caller: &str, account: &str) -> LedgerResult<()> {
    require_owner(state, caller)?;
    state.roles.pausers.remove(account);
    info!(account, "pauser removed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Pause / kill
// ---------------------------------------------------------------------------

pub fn pause(state: &mut LedgerState, caller: &str) -> LedgerResult<()> {
    require_pauser(state, caller)?;
    if state.paused {
        return Err(LedgerError::AlreadyPaused);
    }
    state.paused = true;
    info!(by = caller, "paused");
    Ok(())
}

pub fn unpause(state: &mut LedgerState, caller: &str) -> LedgerResult<()> {
    require_pauser(state, caller)?;
    if !state.paused {
        return Err(LedgerError::NotPaused);
    }
    state.paused = false;
    info!(by = caller, "unpaused");
    Ok(())
}

/// Irreversible. Only reachable from the paused state.
pub fn kill(state: &mut LedgerState, caller: &str) -> LedgerResult<()> {
    require_pauser(state, caller)?;
    if !state.paused {
        return Err(LedgerError::NotPaused);
    }
    state.killed = true;
    info!(by = caller, "killed");
    Ok(())
}
