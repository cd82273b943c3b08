//! VestingLedger v1: Engine
//!
//! Top-level facade. Every mutation runs against a staged copy of the
//! state, is checked against the invariants, and only then replaces the
//! live state. A failed call leaves the ledger untouched.

use tracing::{debug, warn};

use crate::calls::Call;
use crate::clock::{Clock, SystemClock};
use crate::config::TokenConfig;
use crate::domain::{
    AccountId, Amount, Day, GrantorRestrictions, LedgerState, UniformGrantorConfig,
    VestingSchedule, VestingStatus,
};
use crate::error::{LedgerError, LedgerResult};
use crate::invariants::validate_invariants;
use crate::state::create_initial_state;
use crate::vesting::GrantTerms;
use crate::{ledger, registry, roles, uniform, vesting};

/// Stateful engine owning one ledger and its day oracle.
pub struct TokenEngine {
    state: LedgerState,
    clock: Box<dyn Clock>,
}

impl TokenEngine {
    pub fn new(config: &TokenConfig, clock: impl Clock + 'static) -> Self {
        Self::from_state(create_initial_state(config), clock)
    }

    pub fn with_system_clock(config: &TokenConfig) -> Self {
        Self::new(config, SystemClock)
    }

    /// Resume from a previously validated state (snapshot restore).
    pub fn from_state(state: LedgerState, clock: impl Clock + 'static) -> Self {
        Self {
            state,
            clock: Box::new(clock),
        }
    }

    /// Raw state for hashing and snapshots. Never used for authorization.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn is_killed(&self) -> bool {
        self.state.killed
    }

    // -----------------------------------------------------------------------
    // Transaction plumbing
    // -----------------------------------------------------------------------

    fn commit<T>(
        &mut self,
        op: &'static str,
        caller: &str,
        f: impl FnOnce(&mut LedgerState, Day) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        if self.state.killed {
            warn!(op, caller, "rejected: ledger killed");
            return Err(LedgerError::Killed);
        }
        let today = self.clock.today();
        let mut staged = self.state.clone();
        let result = f(&mut staged, today).and_then(|value| {
            validate_invariants(&staged)
                .map(|()| value)
                .map_err(LedgerError::InvariantViolation)
        });
        match result {
            Ok(value) => {
                self.state = staged;
                debug!(op, caller, day = today, "call applied");
                Ok(value)
            }
            Err(e) => {
                warn!(op, caller, day = today, error = %e, "call rejected");
                Err(e)
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&LedgerState, Day) -> LedgerResult<T>) -> LedgerResult<T> {
        if self.state.killed {
            return Err(LedgerError::Killed);
        }
        f(&self.state, self.clock.today())
    }

    /// Dispatch a journaled call. Typed methods below are the same operations.
    pub fn execute(&mut self, caller: &str, call: &Call) -> LedgerResult<()> {
        match call {
            Call::Transfer { to, amount } => self.transfer(caller, to, *amount),
            Call::SafeTransfer { to, amount } => self.safe_transfer(caller, to, *amount),
            Call::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, *amount)
            }
            Call::Approve { spender, amount } => self.approve(caller, spender, *amount),
            Call::IncreaseAllowance { spender, added } => {
                self.increase_allowance(caller, spender, *added)
            }
            Call::DecreaseAllowance {
                spender,
                subtracted,
            } => self.decrease_allowance(caller, spender, *subtracted),
            Call::Burn { amount } => self.burn(caller, *amount),
            Call::RegisterAccount => self.register_account(caller),
            Call::SetDisplayName { name } => self.set_display_name(caller, name),
            Call::TransferOwnership { new_owner } => self.transfer_ownership(caller, new_owner),
            Call::RenounceOwnership => self.renounce_ownership(caller),
            Call::AddGrantor { account, uniform } => self.add_grantor(caller, account, *uniform),
            Call::RemoveGrantor { account } => self.remove_grantor(caller, account),
            Call::AddPauser { account } => self.add_pauser(caller, account),
            Call::RemovePauser { account } => self.remove_pauser(caller, account),
            Call::Pause => self.pause(caller),
            Call::Unpause => self.unpause(caller),
            Call::Kill => self.kill(caller),
            Call::GrantVestingTokens {
                beneficiary,
                total_amount,
                vesting_amount,
                start_day,
                schedule,
            } => self.grant_vesting_tokens(
                caller,
                beneficiary,
                *total_amount,
                *vesting_amount,
                *start_day,
                *schedule,
            ),
            Call::RevokeGrant { account, revoke_day } => {
                self.revoke_grant(caller, account, *revoke_day).map(|_| ())
            }
            Call::SetRestrictions {
                grantor,
                restrictions,
            } => self.set_restrictions(caller, grantor, *restrictions),
            Call::SetGrantorVestingSchedule { grantor, schedule } => {
                self.set_grantor_vesting_schedule(caller, grantor, *schedule)
            }
            Call::GrantUniformVestingTokens {
                beneficiary,
                total_amount,
                vesting_amount,
                start_day,
            } => self.grant_uniform_vesting_tokens(
                caller,
                beneficiary,
                *total_amount,
                *vesting_amount,
                *start_day,
            ),
            Call::SafeGrantUniformVestingTokens {
                beneficiary,
                total_amount,
                vesting_amount,
                start_day,
            } => self.safe_grant_uniform_vesting_tokens(
                caller,
                beneficiary,
                *total_amount,
                *vesting_amount,
                *start_day,
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Token metadata and clock
    // -----------------------------------------------------------------------

    pub fn name(&self) -> LedgerResult<String> {
        self.read(|s, _| Ok(s.token.name.clone()))
    }

    pub fn symbol(&self) -> LedgerResult<String> {
        self.read(|s, _| Ok(s.token.symbol.clone()))
    }

    pub fn decimals(&self) -> LedgerResult<u8> {
        self.read(|s, _| Ok(s.token.decimals))
    }

    pub fn today(&self) -> LedgerResult<Day> {
        self.read(|_, today| Ok(today))
    }

    // -----------------------------------------------------------------------
    // Ledger
    // -----------------------------------------------------------------------

    pub fn balance_of(&self, account: &str) -> LedgerResult<Amount> {
        self.read(|s, _| Ok(s.balance_of(account)))
    }

    pub fn total_supply(&self) -> LedgerResult<Amount> {
        self.read(|s, _| Ok(s.total_supply))
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> LedgerResult<Amount> {
        self.read(|s, _| Ok(ledger::allowance(s, owner, spender)))
    }

    pub fn transferable_balance_of(&self, account: &str) -> LedgerResult<Amount> {
        self.read(|s, today| ledger::transferable_balance(s, account, today))
    }

    pub fn transfer(&mut self, caller: &str, to: &str, amount: Amount) -> LedgerResult<()> {
        self.commit("transfer", caller, |s, today| {
            ledger::transfer(s, caller, to, amount, today)
        })
    }

    pub fn safe_transfer(&mut self, caller: &str, to: &str, amount: Amount) -> LedgerResult<()> {
        self.commit("safe_transfer", caller, |s, today| {
            ledger::safe_transfer(s, caller, to, amount, today)
        })
    }

    pub fn transfer_from(
        &mut self,
        caller: &str,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.commit("transfer_from", caller, |s, today| {
            ledger::transfer_from(s, caller, from, to, amount, today)
        })
    }

    pub fn approve(&mut self, caller: &str, spender: &str, amount: Amount) -> LedgerResult<()> {
        self.commit("approve", caller, |s, today| {
            ledger::approve(s, caller, spender, amount, today)
        })
    }

    pub fn increase_allowance(
        &mut self,
        caller: &str,
        spender: &str,
        added: Amount,
    ) -> LedgerResult<()> {
        self.commit("increase_allowance", caller, |s, today| {
            ledger::increase_allowance(s, caller, spender, added, today)
        })
    }

    pub fn decrease_allowance(
        &mut self,
        caller: &str,
        spender: &str,
        subtracted: Amount,
    ) -> LedgerResult<()> {
        self.commit("decrease_allowance", caller, |s, _| {
            ledger::decrease_allowance(s, caller, spender, subtracted)
        })
    }

    pub fn burn(&mut self, caller: &str, amount: Amount) -> LedgerResult<()> {
        self.commit("burn", caller, |s, today| ledger::burn(s, caller, amount, today))
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    pub fn register_account(&mut self, caller: &str) -> LedgerResult<()> {
        self.commit("register_account", caller, |s, _| {
            registry::register_account(s, caller);
            Ok(())
        })
    }

    pub fn is_registered(&self, account: &str) -> LedgerResult<bool> {
        self.read(|s, _| Ok(registry::is_registered(s, account)))
    }

    /// `iAm`
    pub fn set_display_name(&mut self, caller: &str, name: &str) -> LedgerResult<()> {
        self.commit("set_display_name", caller, |s, _| {
            registry::set_display_name(s, caller, name)
        })
    }

    pub fn who_am_i(&self, caller: &str) -> LedgerResult<String> {
        self.read(|s, _| Ok(registry::display_name(s, caller)))
    }

    pub fn where_am_i(&self, caller: &str) -> LedgerResult<AccountId> {
        self.read(|_, _| Ok(caller.to_string()))
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    pub fn owner(&self) -> LedgerResult<AccountId> {
        self.read(|s, _| Ok(s.roles.owner.clone()))
    }

    pub fn is_owner(&self, account: &str) -> LedgerResult<bool> {
        self.read(|s, _| Ok(roles::is_owner(s, account)))
    }

    pub fn is_grantor(&self, account: &str) -> LedgerResult<bool> {
        self.read(|s, _| Ok(roles::is_grantor(s, account)))
    }

    pub fn is_uniform_grantor(&self, account: &str) -> LedgerResult<bool> {
        self.read(|s, _| Ok(roles::is_uniform_grantor(s, account)))
    }

    pub fn is_pauser(&self, account: &str) -> LedgerResult<bool> {
        self.read(|s, _| Ok(roles::is_pauser(s, account)))
    }

    pub fn is_paused(&self) -> LedgerResult<bool> {
        self.read(|s, _| Ok(s.paused))
    }

    pub fn transfer_ownership(&mut self, caller: &str, new_owner: &str) -> LedgerResult<()> {
        self.commit("transfer_ownership", caller, |s, _| {
            roles::transfer_ownership(s, caller, new_owner)
        })
    }

    pub fn renounce_ownership(&mut self, caller: &str) -> LedgerResult<()> {
        self.commit("renounce_ownership", caller, |s, _| {
            roles::renounce_ownership(s, caller)
        })
    }

    pub fn add_grantor(&mut self, caller: &str, account: &str, uniform: bool) -> LedgerResult<()> {
        self.commit("add_grantor", caller, |s, _| {
            roles::add_grantor(s, caller, account, uniform)
        })
    }

    pub fn remove_grantor(&mut self, caller: &str, account: &str) -> LedgerResult<()> {
        self.commit("remove_grantor", caller, |s, _| {
            roles::remove_grantor(s, caller, account)
        })
    }

    pub fn add_pauser(&mut self, caller: &str, account: &str) -> LedgerResult<()> {
        self.commit("add_pauser", caller, |s, _| roles::add_pauser(s, caller, account))
    }

    pub fn remove_pauser(&mut self, caller: &str, account: &str) -> LedgerResult<()> {
        self.commit("remove_pauser", caller, |s, _| {
            roles::remove_pauser(s, caller, account)
        })
    }

    pub fn pause(&mut self, caller: &str) -> LedgerResult<()> {
        self.commit("pause", caller, |s, _| roles::pause(s, caller))
    }

    pub fn unpause(&mut self, caller: &str) -> LedgerResult<()> {
        self.commit("unpause", caller, |s, _| roles::unpause(s, caller))
    }

    pub fn kill(&mut self, caller: &str) -> LedgerResult<()> {
        self.commit("kill", caller, |s, _| roles::kill(s, caller))
    }

    // -----------------------------------------------------------------------
    // Grants
    // -----------------------------------------------------------------------

    pub fn grant_vesting_tokens(
        &mut self,
        caller: &str,
        beneficiary: &str,
        total_amount: Amount,
        vesting_amount: Amount,
        start_day: Day,
        schedule: VestingSchedule,
    ) -> LedgerResult<()> {
        let terms = GrantTerms {
            total_amount,
            vesting_amount,
            start_day,
            schedule,
        };
        self.commit("grant_vesting_tokens", caller, |s, today| {
            vesting::grant_vesting_tokens(s, caller, beneficiary, terms, today)
        })
    }

    /// The caller's own vesting status.
    pub fn vesting_as_of(&self, caller: &str, day: Day) -> LedgerResult<VestingStatus> {
        self.read(|s, _| vesting::vesting_status(s, caller, day))
    }

    pub fn vesting_for_account_as_of(
        &self,
        caller: &str,
        account: &str,
        day: Day,
    ) -> LedgerResult<VestingStatus> {
        self.read(|s, _| vesting::vesting_for_account_as_of(s, caller, account, day))
    }

    /// Returns the amount clawed back to the issuing grantor.
    pub fn revoke_grant(&mut self, caller: &str, account: &str, revoke_day: Day) -> LedgerResult<Amount> {
        self.commit("revoke_grant", caller, |s, today| {
            vesting::revoke_grant(s, caller, account, revoke_day, today)
        })
    }

    // -----------------------------------------------------------------------
    // Uniform grantors
    // -----------------------------------------------------------------------

    pub fn set_restrictions(
        &mut self,
        caller: &str,
        grantor: &str,
        restrictions: GrantorRestrictions,
    ) -> LedgerResult<()> {
        self.commit("set_restrictions", caller, |s, _| {
            uniform::set_restrictions(s, caller, grantor, restrictions)
        })
    }

    pub fn set_grantor_vesting_schedule(
        &mut self,
        caller: &str,
        grantor: &str,
        schedule: VestingSchedule,
    ) -> LedgerResult<()> {
        self.commit("set_grantor_vesting_schedule", caller, |s, _| {
            uniform::set_grantor_vesting_schedule(s, caller, grantor, schedule)
        })
    }

    pub fn grantor_restrictions(&self, grantor: &str) -> LedgerResult<Option<UniformGrantorConfig>> {
        self.read(|s, _| Ok(uniform::grantor_restrictions(s, grantor)))
    }

    pub fn grant_uniform_vesting_tokens(
        &mut self,
        caller: &str,
        beneficiary: &str,
        total_amount: Amount,
        vesting_amount: Amount,
        start_day: Day,
    ) -> LedgerResult<()> {
        self.commit("grant_uniform_vesting_tokens", caller, |s, today| {
            uniform::grant_uniform_vesting_tokens(
                s,
                caller,
                beneficiary,
                total_amount,
                vesting_amount,
                start_day,
                today,
            )
        })
    }

    pub fn safe_grant_uniform_vesting_tokens(
        &mut self,
        caller: &str,
        beneficiary: &str,
        total_amount: Amount,
        vesting_amount: Amount,
        start_day: Day,
    ) -> LedgerResult<()> {
        self.commit("safe_grant_uniform_vesting_tokens", caller, |s, today| {
            uniform::safe_grant_uniform_vesting_tokens(
                s,
                caller,
                beneficiary,
                total_amount,
                vesting_amount,
                start_day,
                today,
            )
        })
    }
}
