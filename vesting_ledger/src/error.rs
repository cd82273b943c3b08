//! VestingLedger v1: Error Taxonomy
//!
//! Every rejected call surfaces exactly one `LedgerError`. The `Display`
//! text is the short reason string handed back to the host.

use thiserror::Error;

use crate::domain::{AccountId, Amount, Day};

/// Coarse classification of a failure, used by hosts that only care about
/// the family of an error rather than its exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authorization,
    InvariantViolation,
    InvalidArgument,
    State,
    Revocation,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // -- Authorization --
    #[error("not authorized: {0}")]
    NotAuthorized(&'static str),

    #[error("account not registered: {0}")]
    AccountNotRegistered(AccountId),

    #[error("not a uniform grantor: {0}")]
    NotUniformGrantor(AccountId),

    // -- Invariant violations --
    #[error("insufficient funds: {account} can move {available}, requested {requested}")]
    InsufficientBalance {
        account: AccountId,
        available: Amount,
        requested: Amount,
    },

    #[error("insufficient allowance: {spender} may spend {allowed} of {owner}, requested {requested}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        allowed: Amount,
        requested: Amount,
    },

    #[error("insufficient issuer funds: available {available}, grant needs {requested}")]
    InsufficientIssuerBalance { available: Amount, requested: Amount },

    #[error("vesting amount {vesting} exceeds total amount {total}")]
    VestingExceedsTotal { vesting: Amount, total: Amount },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    // -- Invalid arguments --
    #[error("invalid schedule: {0}")]
    InvalidScheduleBounds(String),

    #[error("grant already exists for {0}")]
    DuplicateGrant(AccountId),

    #[error("schedule already exists for {0}")]
    ScheduleAlreadyExists(AccountId),

    #[error("display name is {len} bytes, limit is 32")]
    DisplayNameTooLong { len: usize },

    // -- State errors --
    #[error("paused")]
    Paused,

    #[error("already paused")]
    AlreadyPaused,

    #[error("not paused")]
    NotPaused,

    #[error("contract killed")]
    Killed,

    #[error("outside restriction window: {0}")]
    OutsideRestrictionWindow(String),

    #[error("grantor account not ready: {0}")]
    GrantorNotReady(AccountId),

    // -- Revocation --
    #[error("no active grant for {0}")]
    NoActiveGrant(AccountId),

    #[error("grant is not revocable")]
    NotRevocable,

    #[error("revocation on day {revoke_day} has no effect (window {start_day}..{fully_vested_day})")]
    RevocationWindowClosed {
        revoke_day: Day,
        start_day: Day,
        fully_vested_day: Day,
    },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        use LedgerError::*;
        match self {
            NotAuthorized(_) | AccountNotRegistered(_) | NotUniformGrantor(_) => {
                ErrorKind::Authorization
            }
            InsufficientBalance { .. }
            | InsufficientAllowance { .. }
            | InsufficientIssuerBalance { .. }
            | VestingExceedsTotal { .. }
            | ArithmeticOverflow
            | InvariantViolation(_) => ErrorKind::InvariantViolation,
            InvalidScheduleBounds(_)
            | DuplicateGrant(_)
            | ScheduleAlreadyExists(_)
            | DisplayNameTooLong { .. } => ErrorKind::InvalidArgument,
            Paused
            | AlreadyPaused
            | NotPaused
            | Killed
            | OutsideRestrictionWindow(_)
            | GrantorNotReady(_) => ErrorKind::State,
            NoActiveGrant(_) | NotRevocable | RevocationWindowClosed { .. } => {
                ErrorKind::Revocation
            }
        }
    }

    /// Short reason string for the host.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
