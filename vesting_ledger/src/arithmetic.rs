//! VestingLedger v1: Arithmetic Primitives
//!
//! All amounts: u128 fixed-point with 18 implied fractional digits.
//! No float anywhere. Every operation is checked and surfaces
//! `ArithmeticOverflow` instead of wrapping or panicking.

use crate::domain::Amount;
use crate::error::{LedgerError, LedgerResult};

/// Implied fractional digits of every amount.
pub const DECIMALS: u8 = 18;

/// One whole token in the smallest indivisible unit.
pub const WEI: Amount = 1_000_000_000_000_000_000;

pub fn checked_add(a: Amount, b: Amount) -> LedgerResult<Amount> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn checked_sub(a: Amount, b: Amount) -> LedgerResult<Amount> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn checked_mul(a: Amount, b: Amount) -> LedgerResult<Amount> {
    a.checked_mul(b).ok_or(LedgerError::ArithmeticOverflow)
}

/// `a * b / d`, truncating. Division by zero counts as overflow.
pub fn mul_div(a: Amount, b: Amount, d: Amount) -> LedgerResult<Amount> {
    if d == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(checked_mul(a, b)? / d)
}

/// Whole tokens to smallest units (`n` followed by 18 zeroes).
pub fn tokens(whole: u64) -> Amount {
    // u64::MAX * 10^18 < u128::MAX
    Amount::from(whole) * WEI
}
