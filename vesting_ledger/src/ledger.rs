//! VestingLedger v1: Balances and Allowances
//!
//! Every outgoing movement is bounded by the transferable balance: the
//! account balance minus whatever its active grant still locks today.

use crate::arithmetic::{checked_add, checked_sub};
use crate::domain::{Amount, Day, LedgerState};
use crate::error::{LedgerError, LedgerResult};
use crate::registry::require_registered;
use crate::roles::require_not_paused;
use crate::vesting::not_vested_as_of;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn transferable_balance(state: &LedgerState, account: &str, today: Day) -> LedgerResult<Amount> {
    let balance = state.balance_of(account);
    let locked = match state.grant_of(account) {
        Some(grant) => not_vested_as_of(grant, today)?,
        None => 0,
    };
    Ok(balance.saturating_sub(locked))
}

pub fn allowance(state: &LedgerState, owner: &str, spender: &str) -> Amount {
    state
        .account(owner)
        .and_then(|a| a.allowances.get(spender).copied())
        .unwrap_or(0)
}

fn require_transferable(
    state: &LedgerState,
    account: &str,
    amount: Amount,
    today: Day,
) -> LedgerResult<()> {
    let available = transferable_balance(state, account, today)?;
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            account: account.to_string(),
            available,
            requested: amount,
        });
    }
    Ok(())
}

/// A zero allowance is a removal and never creates the owner's account.
fn set_allowance(state: &mut LedgerState, owner: &str, spender: &str, amount: Amount) {
    if amount == 0 {
        if let Some(account) = state.accounts.get_mut(owner) {
            account.allowances.remove(spender);
        }
    } else {
        state
            .account_mut(owner)
            .allowances
            .insert(spender.to_string(), amount);
    }
}

// ---------------------------------------------------------------------------
// Raw movement
// ---------------------------------------------------------------------------

/// Moves `amount` between balances with no lock, pause or allowance checks.
/// Grant issuance and revocation build on this. A zero amount touches no
/// account.
pub(crate) fn move_balance(
    state: &mut LedgerState,
    from: &str,
    to: &str,
    amount: Amount,
) -> LedgerResult<()> {
    let from_balance = state.balance_of(from);
    let debited = checked_sub(from_balance, amount).map_err(|_| LedgerError::InsufficientBalance {
        account: from.to_string(),
        available: from_balance,
        requested: amount,
    })?;
    if from == to || amount == 0 {
        return Ok(());
    }
    let credited = checked_add(state.balance_of(to), amount)?;
    state.account_mut(from).balance = debited;
    state.account_mut(to).balance = credited;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

pub fn transfer(
    state: &mut LedgerState,
    from: &str,
    to: &str,
    amount: Amount,
    today: Day,
) -> LedgerResult<()> {
    require_not_paused(state)?;
    require_transferable(state, from, amount, today)?;
    move_balance(state, from, to, amount)
}

/// `transfer` that refuses unregistered recipients.
pub fn safe_transfer(
    state: &mut LedgerState,
    from: &str,
    to: &str,
    amount: Amount,
    today: Day,
) -> LedgerResult<()> {
    require_registered(state, to)?;
    transfer(state, from, to, amount, today)
}

pub fn transfer_from(
    state: &mut LedgerState,
    spender: &str,
    from: &str,
    to: &str,
    amount: Amount,
    today: Day,
) -> LedgerResult<()> {
    require_not_paused(state)?;
    let allowed = allowance(state, from, spender);
    if allowed < amount {
        return Err(LedgerError::InsufficientAllowance {
            owner: from.to_string(),
            spender: spender.to_string(),
            allowed,
            requested: amount,
        });
    }
    require_transferable(state, from, amount, today)?;
    set_allowance(state, from, spender, allowed - amount);
    move_balance(state, from, to, amount)
}

// ---------------------------------------------------------------------------
// Allowances
// ---------------------------------------------------------------------------

/// Sets the allowance outright. It may not exceed what the owner can move today.
pub fn approve(
    state: &mut LedgerState,
    owner: &str,
    spender: &str,
    amount: Amount,
    today: Day,
) -> LedgerResult<()> {
    require_not_paused(state)?;
    require_transferable(state, owner, amount, today)?;
    set_allowance(state, owner, spender, amount);
    Ok(())
}

pub fn increase_allowance(
    state: &mut LedgerState,
    owner: &str,
    spender: &str,
    added: Amount,
    today: Day,
) -> LedgerResult<()> {
    require_not_paused(state)?;
    require_transferable(state, owner, added, today)?;
    let updated = checked_add(allowance(state, owner, spender), added)?;
    set_allowance(state, owner, spender, updated);
    Ok(())
}

pub fn decrease_allowance(
    state: &mut LedgerState,
    owner: &str,
    spender: &str,
    subtracted: Amount,
) -> LedgerResult<()> {
    require_not_paused(state)?;
    let current = allowance(state, owner, spender);
    if current < subtracted {
        return Err(LedgerError::InsufficientAllowance {
            owner: owner.to_string(),
            spender: spender.to_string(),
            allowed: current,
            requested: subtracted,
        });
    }
    set_allowance(state, owner, spender, current - subtracted);
    Ok(())
}

// ---------------------------------------------------------------------------
// Burn
// ---------------------------------------------------------------------------

/// Destroys transferable tokens; total supply shrinks by the same amount.
pub fn burn(state: &mut LedgerState, account: &str, amount: Amount, today: Day) -> LedgerResult<()> {
    require_not_paused(state)?;
    require_transferable(state, account, amount, today)?;
    if amount == 0 {
        return Ok(());
    }
    let remaining = checked_sub(state.balance_of(account), amount)?;
    let supply = checked_sub(state.total_supply, amount)?;
    state.account_mut(account).balance = remaining;
    state.total_supply = supply;
    tracing::info!(account, amount = %amount, "tokens burned");
    Ok(())
}
