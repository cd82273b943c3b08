//! VestingLedger v1: Grant Engine
//!
//! Grants are balance transfers with a vesting overlay. Issuing moves the
//! full `total_amount` to the beneficiary; the unvested part of
//! `vesting_amount` is then locked against outgoing transfers until it
//! vests. Revoking sends exactly the unvested remainder back to the issuer.
//!
//! Vesting is a step function of elapsed days:
//!
//! ```text
//! elapsed < cliff       -> 0
//! elapsed >= duration   -> vesting_amount
//! otherwise             -> vesting_amount * floor(elapsed / interval) * interval / duration
//! ```

use tracing::info;

use crate::arithmetic::{checked_sub, mul_div};
use crate::clock::{JAN_1_2000_DAY, JAN_1_2100_DAY, TEN_YEARS_DAYS};
use crate::domain::{AccountId, Amount, Day, Grant, LedgerState, VestingSchedule, VestingStatus};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{move_balance, transferable_balance};
use crate::roles::{is_owner, require_not_paused, require_standard_grantor};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_schedule(schedule: &VestingSchedule) -> LedgerResult<()> {
    let VestingSchedule {
        duration,
        cliff_duration,
        interval,
        ..
    } = *schedule;

    if duration == 0 || duration > TEN_YEARS_DAYS {
        return Err(LedgerError::InvalidScheduleBounds(format!(
            "duration {} outside 1..={}",
            duration, TEN_YEARS_DAYS
        )));
    }
    if interval == 0 || interval > duration {
        return Err(LedgerError::InvalidScheduleBounds(format!(
            "interval {} outside 1..={}",
            interval, duration
        )));
    }
    if cliff_duration > duration {
        return Err(LedgerError::InvalidScheduleBounds(format!(
            "cliff {} exceeds duration {}",
            cliff_duration, duration
        )));
    }
    Ok(())
}

pub fn validate_start_day(start_day: Day) -> LedgerResult<()> {
    if !(JAN_1_2000_DAY..JAN_1_2100_DAY).contains(&start_day) {
        return Err(LedgerError::InvalidScheduleBounds(format!(
            "start day {} outside {}..{}",
            start_day, JAN_1_2000_DAY, JAN_1_2100_DAY
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Vesting math
// ---------------------------------------------------------------------------

/// Vested part of `vesting_amount` on `day`, ignoring revocation state.
pub fn vested_as_of(grant: &Grant, day: Day) -> LedgerResult<Amount> {
    let s = &grant.schedule;
    if day < grant.start_day {
        return Ok(0);
    }
    let elapsed = day - grant.start_day;
    if elapsed < s.cliff_duration {
        return Ok(0);
    }
    if elapsed >= s.duration {
        return Ok(grant.vesting_amount);
    }
    if s.interval == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    let effective = elapsed / s.interval * s.interval;
    mul_div(
        grant.vesting_amount,
        Amount::from(effective),
        Amount::from(s.duration),
    )
}

/// Amount still locked on `day`. Inactive grants lock nothing.
pub fn not_vested_as_of(grant: &Grant, day: Day) -> LedgerResult<Amount> {
    if !grant.is_active {
        return Ok(0);
    }
    checked_sub(grant.vesting_amount, vested_as_of(grant, day)?)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn vesting_status(state: &LedgerState, account: &str, day: Day) -> LedgerResult<VestingStatus> {
    let grant = match state.grant_of(account) {
        Some(g) => g,
        None => return Ok(VestingStatus::default()),
    };

    let mut status = VestingStatus {
        start_day: grant.start_day,
        duration: grant.schedule.duration,
        cliff_duration: grant.schedule.cliff_duration,
        interval: grant.schedule.interval,
        is_active: grant.is_active,
        was_revoked: grant.was_revoked,
        ..Default::default()
    };
    if grant.is_active {
        let vested = vested_as_of(grant, day)?;
        status.vested = vested;
        status.not_vested = checked_sub(grant.vesting_amount, vested)?;
        status.vesting_amount = grant.vesting_amount;
    }
    Ok(status)
}

/// Open to the account itself, its issuing grantor and the owner.
pub fn vesting_for_account_as_of(
    state: &LedgerState,
    caller: &str,
    account: &str,
    day: Day,
) -> LedgerResult<VestingStatus> {
    let is_issuer = state
        .grant_of(account)
        .map(|g| g.grantor == caller)
        .unwrap_or(false);
    if caller != account && !is_issuer && !is_owner(state, caller) {
        return Err(LedgerError::NotAuthorized(
            "only the account or its grantor may inspect vesting",
        ));
    }
    vesting_status(state, account, day)
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// Terms of a grant as supplied by the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantTerms {
    pub total_amount: Amount,
    pub vesting_amount: Amount,
    pub start_day: Day,
    pub schedule: VestingSchedule,
}

/// `grantVestingTokens`: owner or standard grantor, any valid schedule.
pub fn grant_vesting_tokens(
    state: &mut LedgerState,
    issuer: &str,
    beneficiary: &str,
    terms: GrantTerms,
    today: Day,
) -> LedgerResult<()> {
    require_standard_grantor(state, issuer)?;
    issue_grant(state, issuer, beneficiary, terms, today)
}

/// Shared issuance path. Authorization is the caller's job.
pub(crate) fn issue_grant(
    state: &mut LedgerState,
    issuer: &str,
    beneficiary: &str,
    terms: GrantTerms,
    today: Day,
) -> LedgerResult<()> {
    require_not_paused(state)?;

    if state.grant_of(beneficiary).map(|g| g.is_active).unwrap_or(false) {
        return Err(LedgerError::DuplicateGrant(beneficiary.to_string()));
    }
    if terms.vesting_amount > terms.total_amount {
        return Err(LedgerError::VestingExceedsTotal {
            vesting: terms.vesting_amount,
            total: terms.total_amount,
        });
    }
    validate_start_day(terms.start_day)?;
    validate_schedule(&terms.schedule)?;

    let available = transferable_balance(state, issuer, today)?;
    if available < terms.total_amount {
        return Err(LedgerError::InsufficientIssuerBalance {
            available,
            requested: terms.total_amount,
        });
    }

    move_balance(state, issuer, beneficiary, terms.total_amount)?;
    state.account_mut(beneficiary).grant = Some(Grant {
        grantor: issuer.to_string(),
        total_amount: terms.total_amount,
        vesting_amount: terms.vesting_amount,
        start_day: terms.start_day,
        schedule: terms.schedule,
        is_active: true,
        was_revoked: false,
    });

    info!(
        issuer,
        beneficiary,
        total = %terms.total_amount,
        vesting = %terms.vesting_amount,
        start_day = terms.start_day,
        "grant issued"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

/// Claws back the part of the grant not yet vested on `revoke_day` and
/// closes the grant. Returns the amount returned to the issuer.
///
/// The window is `max(start_day, today) <= revoke_day < fully_vested_day`,
/// and something must still be unvested on that day.
pub fn revoke_grant(
    state: &mut LedgerState,
    caller: &str,
    account: &str,
    revoke_day: Day,
    today: Day,
) -> LedgerResult<Amount> {
    require_not_paused(state)?;

    let grant = match state.grant_of(account) {
        Some(g) if g.is_active => g.clone(),
        _ => return Err(LedgerError::NoActiveGrant(account.to_string())),
    };
    if caller != grant.grantor && !is_owner(state, caller) {
        return Err(LedgerError::NotAuthorized("only the issuing grantor may revoke"));
    }
    if !grant.schedule.is_revocable {
        return Err(LedgerError::NotRevocable);
    }

    let fully_vested_day = grant.fully_vested_day();
    let closed = LedgerError::RevocationWindowClosed {
        revoke_day,
        start_day: grant.start_day,
        fully_vested_day,
    };
    if revoke_day < grant.start_day || revoke_day < today || revoke_day >= fully_vested_day {
        return Err(closed);
    }
    let not_vested = not_vested_as_of(&grant, revoke_day)?;
    if not_vested == 0 {
        return Err(closed);
    }

    let issuer: AccountId = grant.grantor;
    move_balance(state, account, &issuer, not_vested)?;
    if let Some(g) = state.account_mut(account).grant.as_mut() {
        g.is_active = false;
        g.was_revoked = true;
    }

    info!(account, issuer = %issuer, returned = %not_vested, revoke_day, "grant revoked");
    Ok(not_vested)
}
