//! VestingLedger v1: Uniform Grantor Policy
//!
//! A uniform grantor issues grants on one owner-fixed schedule, inside an
//! owner-set window of start days, until an expiration day.

use crate::domain::{
    Amount, Day, GrantorRestrictions, GrantorRole, LedgerState, UniformGrantorConfig,
    VestingSchedule,
};
use crate::error::{LedgerError, LedgerResult};
use crate::registry::require_registered;
use crate::roles::require_owner;
use crate::vesting::{issue_grant, validate_schedule, GrantTerms};

fn uniform_config_mut<'a>(
    state: &'a mut LedgerState,
    grantor: &str,
) -> LedgerResult<&'a mut UniformGrantorConfig> {
    match state.roles.grantors.get_mut(grantor) {
        Some(GrantorRole::Uniform(config)) => Ok(config),
        _ => Err(LedgerError::NotUniformGrantor(grantor.to_string())),
    }
}

/// The grantor's configuration, when it is a uniform grantor at all.
pub fn grantor_restrictions(state: &LedgerState, grantor: &str) -> Option<UniformGrantorConfig> {
    match state.roles.grantors.get(grantor) {
        Some(GrantorRole::Uniform(config)) => Some(*config),
        _ => None,
    }
}

pub fn set_restrictions(
    state: &mut LedgerState,
    caller: &str,
    grantor: &str,
    restrictions: GrantorRestrictions,
) -> LedgerResult<()> {
    require_owner(state, caller)?;
    require_registered(state, grantor)?;
    let config = uniform_config_mut(state, grantor)?;
    if restrictions.min_start_day > restrictions.max_start_day {
        return Err(LedgerError::InvalidScheduleBounds(format!(
            "min start day {} after max start day {}",
            restrictions.min_start_day, restrictions.max_start_day
        )));
    }
    config.restrictions = Some(restrictions);
    tracing::info!(
        grantor,
        min_start_day = restrictions.min_start_day,
        max_start_day = restrictions.max_start_day,
        expiration_day = restrictions.expiration_day,
        "grantor restrictions set"
    );
    Ok(())
}

/// Settable once per grantor.
pub fn set_grantor_vesting_schedule(
    state: &mut LedgerState,
    caller: &str,
    grantor: &str,
    schedule: VestingSchedule,
) -> LedgerResult<()> {
    require_owner(state, caller)?;
    require_registered(state, grantor)?;
    validate_schedule(&schedule)?;
    let locked = state.roles.uniform_schedules.contains_key(grantor);
    let config = uniform_config_mut(state, grantor)?;
    if locked || config.schedule.is_some() {
        return Err(LedgerError::ScheduleAlreadyExists(grantor.to_string()));
    }
    config.schedule = Some(schedule);
    state
        .roles
        .uniform_schedules
        .insert(grantor.to_string(), schedule);
    tracing::info!(grantor, duration = schedule.duration, "grantor schedule set");
    Ok(())
}

pub fn grant_uniform_vesting_tokens(
    state: &mut LedgerState,
    grantor: &str,
    beneficiary: &str,
    total_amount: Amount,
    vesting_amount: Amount,
    start_day: Day,
    today: Day,
) -> LedgerResult<()> {
    let config = match state.roles.grantors.get(grantor) {
        Some(GrantorRole::Uniform(config)) => *config,
        Some(GrantorRole::Standard) => {
            return Err(LedgerError::NotUniformGrantor(grantor.to_string()))
        }
        None => return Err(LedgerError::NotAuthorized("caller is not a grantor")),
    };
    require_registered(state, grantor)?;

    let (restrictions, schedule) = config
        .ready_terms()
        .ok_or_else(|| LedgerError::GrantorNotReady(grantor.to_string()))?;
    if start_day < restrictions.min_start_day || start_day > restrictions.max_start_day {
        return Err(LedgerError::OutsideRestrictionWindow(format!(
            "start day {} outside {}..={}",
            start_day, restrictions.min_start_day, restrictions.max_start_day
        )));
    }
    if today >= restrictions.expiration_day {
        return Err(LedgerError::OutsideRestrictionWindow(format!(
            "grantor expired on day {}",
            restrictions.expiration_day
        )));
    }

    issue_grant(
        state,
        grantor,
        beneficiary,
        GrantTerms {
            total_amount,
            vesting_amount,
            start_day,
            schedule,
        },
        today,
    )
}

/// Uniform grant to an already registered beneficiary.
pub fn safe_grant_uniform_vesting_tokens(
    state: &mut LedgerState,
    grantor: &str,
    beneficiary: &str,
    total_amount: Amount,
    vesting_amount: Amount,
    start_day: Day,
    today: Day,
) -> LedgerResult<()> {
    require_registered(state, beneficiary)?;
    grant_uniform_vesting_tokens(
        state,
        grantor,
        beneficiary,
        total_amount,
        vesting_amount,
        start_day,
        today,
    )
}
