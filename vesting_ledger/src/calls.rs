//! VestingLedger v1: Call Definitions
//!
//! Calls are pure data. They carry intent and arguments only; the caller
//! identity and the day travel in the envelope. Read-only queries are not
//! calls and are never journaled.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Amount, Day, GrantorRestrictions, VestingSchedule};

/// Every state-changing operation the engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Call {
    // -- Ledger --
    Transfer { to: AccountId, amount: Amount },
    SafeTransfer { to: AccountId, amount: Amount },
    TransferFrom { from: AccountId, to: AccountId, amount: Amount },
    Approve { spender: AccountId, amount: Amount },
    IncreaseAllowance { spender: AccountId, added: Amount },
    DecreaseAllowance { spender: AccountId, subtracted: Amount },
    Burn { amount: Amount },

    // -- Registry --
    RegisterAccount,
    SetDisplayName { name: String },

    // -- Roles --
    TransferOwnership { new_owner: AccountId },
    RenounceOwnership,
    AddGrantor { account: AccountId, uniform: bool },
    RemoveGrantor { account: AccountId },
    AddPauser { account: AccountId },
    RemovePauser { account: AccountId },
    Pause,
    Unpause,
    Kill,

    // -- Grants --
    GrantVestingTokens {
        beneficiary: AccountId,
        total_amount: Amount,
        vesting_amount: Amount,
        start_day: Day,
        schedule: VestingSchedule,
    },
    RevokeGrant { account: AccountId, revoke_day: Day },

    // -- Uniform grantors --
    SetRestrictions { grantor: AccountId, restrictions: GrantorRestrictions },
    SetGrantorVestingSchedule { grantor: AccountId, schedule: VestingSchedule },
    GrantUniformVestingTokens {
        beneficiary: AccountId,
        total_amount: Amount,
        vesting_amount: Amount,
        start_day: Day,
    },
    SafeGrantUniformVestingTokens {
        beneficiary: AccountId,
        total_amount: Amount,
        vesting_amount: Amount,
        start_day: Day,
    },
}

impl Call {
    /// Stable operation name, used in logs and journal exports.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Transfer { .. } => "transfer",
            Call::SafeTransfer { .. } => "safe_transfer",
            Call::TransferFrom { .. } => "transfer_from",
            Call::Approve { .. } => "approve",
            Call::IncreaseAllowance { .. } => "increase_allowance",
            Call::DecreaseAllowance { .. } => "decrease_allowance",
            Call::Burn { .. } => "burn",
            Call::RegisterAccount => "register_account",
            Call::SetDisplayName { .. } => "set_display_name",
            Call::TransferOwnership { .. } => "transfer_ownership",
            Call::RenounceOwnership => "renounce_ownership",
            Call::AddGrantor { .. } => "add_grantor",
            Call::RemoveGrantor { .. } => "remove_grantor",
            Call::AddPauser { .. } => "add_pauser",
            Call::RemovePauser { .. } => "remove_pauser",
            Call::Pause => "pause",
            Call::Unpause => "unpause",
            Call::Kill => "kill",
            Call::GrantVestingTokens { .. } => "grant_vesting_tokens",
            Call::RevokeGrant { .. } => "revoke_grant",
            Call::SetRestrictions { .. } => "set_restrictions",
            Call::SetGrantorVestingSchedule { .. } => "set_grantor_vesting_schedule",
            Call::GrantUniformVestingTokens { .. } => "grant_uniform_vesting_tokens",
            Call::SafeGrantUniformVestingTokens { .. } => "safe_grant_uniform_vesting_tokens",
        }
    }
}

/// A call as accepted by a host: who made it, on which day, in which order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallEnvelope {
    pub sequence: u64,
    pub caller: AccountId,
    pub day: Day,
    pub call: Call,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_are_externally_tagged_snake_case() {
        let json = serde_json::to_string(&Call::Pause).unwrap();
        assert_eq!(json, r#""pause""#);
        let json = serde_json::to_string(&Call::Burn { amount: 5 }).unwrap();
        assert_eq!(json, r#"{"burn":{"amount":5}}"#);
    }

    #[test]
    fn large_amounts_survive_json() {
        let call = Call::Transfer {
            to: "bob".into(),
            amount: 5_000_000_000_000_000_000_000_000_000,
        };
        let text = serde_json::to_string(&call).unwrap();
        let back: Call = serde_json::from_str(&text).unwrap();
        assert_eq!(back, call);
    }

    #[test]
    fn unknown_call_is_rejected() {
        assert!(serde_json::from_str::<Call>(r#"{"mint":{"amount":1}}"#).is_err());
    }
}
