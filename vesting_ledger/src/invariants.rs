//! VestingLedger v1: Invariant Checks
//!
//! Run against the staged state after every transition and on snapshot
//! restore. Returns `Err(message)` on the first failure.

use crate::domain::{GrantorRole, LedgerState};
use crate::vesting::{validate_schedule, validate_start_day};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn validate_invariants(state: &LedgerState) -> Result<(), String> {
    check_supply_conservation(state)?;
    check_grants(state)?;
    check_uniform_schedules(state)?;
    check_owner(state)?;
    check_allowances(state)?;
    check_kill_implies_pause(state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// totalSupply == sum of all balances.
fn check_supply_conservation(state: &LedgerState) -> Result<(), String> {
    let mut sum: u128 = 0;
    for (id, account) in &state.accounts {
        sum = sum.checked_add(account.balance).ok_or_else(|| {
            format!("[INVARIANT:supply_conservation] balance sum overflows at {:?}", id)
        })?;
    }
    if sum != state.total_supply {
        return Err(format!(
            "[INVARIANT:supply_conservation] balances sum to {} but total supply is {}",
            sum, state.total_supply
        ));
    }
    Ok(())
}

/// Every stored grant, active or revoked, carries valid terms.
fn check_grants(state: &LedgerState) -> Result<(), String> {
    for (id, account) in &state.accounts {
        let grant = match &account.grant {
            Some(g) => g,
            None => continue,
        };
        if grant.vesting_amount > grant.total_amount {
            return Err(format!(
                "[INVARIANT:grant_terms] grant of {:?} vests {} of only {}",
                id, grant.vesting_amount, grant.total_amount
            ));
        }
        if grant.is_active && grant.was_revoked {
            return Err(format!(
                "[INVARIANT:grant_terms] grant of {:?} is both active and revoked",
                id
            ));
        }
        validate_start_day(grant.start_day)
            .and_then(|()| validate_schedule(&grant.schedule))
            .map_err(|e| format!("[INVARIANT:grant_terms] grant of {:?}: {}", id, e))?;
    }
    Ok(())
}

/// Every recorded uniform schedule is valid, and a uniform grantor carries
/// exactly the schedule recorded for it.
fn check_uniform_schedules(state: &LedgerState) -> Result<(), String> {
    for (id, schedule) in &state.roles.uniform_schedules {
        validate_schedule(schedule)
            .map_err(|e| format!("[INVARIANT:uniform_schedule] grantor {:?}: {}", id, e))?;
    }
    for (id, role) in &state.roles.grantors {
        if let GrantorRole::Uniform(config) = role {
            let recorded = state.roles.uniform_schedules.get(id);
            if config.schedule.as_ref() != recorded {
                return Err(format!(
                    "[INVARIANT:uniform_schedule] grantor {:?} carries {:?}, recorded {:?}",
                    id, config.schedule, recorded
                ));
            }
        }
    }
    Ok(())
}

fn check_owner(state: &LedgerState) -> Result<(), String> {
    let owner = &state.roles.owner;
    if owner.is_empty() {
        return Err("[INVARIANT:owner] ledger has no owner".to_string());
    }
    if !state.account(owner).map(|a| a.registered).unwrap_or(false) {
        return Err(format!("[INVARIANT:owner] owner {:?} is not registered", owner));
    }
    Ok(())
}

/// Zero allowances are removed, never stored.
fn check_allowances(state: &LedgerState) -> Result<(), String> {
    for (id, account) in &state.accounts {
        if let Some((spender, _)) = account.allowances.iter().find(|(_, v)| **v == 0) {
            return Err(format!(
                "[INVARIANT:allowances] zero allowance stored for {:?} -> {:?}",
                id, spender
            ));
        }
    }
    Ok(())
}

fn check_kill_implies_pause(state: &LedgerState) -> Result<(), String> {
    if state.killed && !state.paused {
        return Err("[INVARIANT:kill_state] killed ledger is not paused".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::state::create_initial_state;

    #[test]
    fn fresh_state_is_valid() {
        let state = create_initial_state(&TokenConfig::default());
        assert_eq!(validate_invariants(&state), Ok(()));
    }

    #[test]
    fn minted_out_of_thin_air_is_caught() {
        let mut state = create_initial_state(&TokenConfig::default());
        state.account_mut("bob").balance = 1;
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.contains("supply_conservation"));
    }

    #[test]
    fn unregistered_owner_is_caught() {
        let mut state = create_initial_state(&TokenConfig::default());
        state.roles.owner = "ghost".into();
        assert!(validate_invariants(&state).unwrap_err().contains("owner"));
    }

    #[test]
    fn unrecorded_uniform_schedule_is_caught() {
        let mut state = create_initial_state(&TokenConfig::default());
        let schedule = crate::domain::VestingSchedule {
            duration: 12,
            cliff_duration: 0,
            interval: 1,
            is_revocable: true,
        };
        state.roles.grantors.insert(
            "g".into(),
            GrantorRole::Uniform(crate::domain::UniformGrantorConfig {
                restrictions: None,
                schedule: Some(schedule),
            }),
        );
        let err = validate_invariants(&state).unwrap_err();
        assert!(err.contains("uniform_schedule"));

        state.roles.uniform_schedules.insert("g".into(), schedule);
        assert_eq!(validate_invariants(&state), Ok(()));
    }

    #[test]
    fn killed_without_pause_is_caught() {
        let mut state = create_initial_state(&TokenConfig::default());
        state.killed = true;
        assert!(validate_invariants(&state).unwrap_err().contains("kill_state"));
    }
}
