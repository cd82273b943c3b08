//! VestingLedger v1: Account Registry
//!
//! Which identities are known, and what they call themselves.

use crate::domain::LedgerState;
use crate::error::{LedgerError, LedgerResult};

pub fn register_account(state: &mut LedgerState, who: &str) {
    state.account_mut(who).registered = true;
}

pub fn is_registered(state: &LedgerState, who: &str) -> bool {
    state.account(who).map(|a| a.registered).unwrap_or(false)
}

pub fn require_registered(state: &LedgerState, who: &str) -> LedgerResult<()> {
    if !is_registered(state, who) {
        return Err(LedgerError::AccountNotRegistered(who.to_string()));
    }
    Ok(())
}

/// Longest accepted display name, in bytes.
pub const MAX_DISPLAY_NAME_BYTES: usize = 32;

pub fn validate_display_name(name: &str) -> LedgerResult<()> {
    if name.len() > MAX_DISPLAY_NAME_BYTES {
        return Err(LedgerError::DisplayNameTooLong { len: name.len() });
    }
    Ok(())
}

pub fn set_display_name(state: &mut LedgerState, who: &str, name: &str) -> LedgerResult<()> {
    validate_display_name(name)?;
    state.account_mut(who).display_name = Some(name.to_string());
    Ok(())
}

/// Empty when the caller never set a name.
pub fn display_name(state: &LedgerState, who: &str) -> String {
    state
        .account(who)
        .and_then(|a| a.display_name.clone())
        .unwrap_or_default()
}
