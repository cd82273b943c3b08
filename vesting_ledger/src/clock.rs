//! VestingLedger v1: Day Clock
//!
//! All vesting arithmetic runs on integer days (86400-second periods since
//! the Unix epoch). The engine never reads the wall clock directly; "today"
//! always comes from an injected `Clock`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::Day;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Saturday, January 1, 2000 0:00:00 GMT.
pub const JAN_1_2000_DAY: Day = 10_957;

/// Friday, January 1, 2100 0:00:00 GMT.
pub const JAN_1_2100_DAY: Day = 47_482;

/// Days in a thousand Gregorian years, used to derive the ten-year cap.
pub const THOUSAND_YEARS_DAYS: Day = 365_243;

/// Longest permitted vesting duration.
pub const TEN_YEARS_DAYS: Day = THOUSAND_YEARS_DAYS / 100;

/// Source of the current day.
pub trait Clock: Send + Sync {
    fn today(&self) -> Day;
}

/// Converts Unix seconds to a day number, saturating at `Day::MAX`.
pub fn day_from_unix_seconds(secs: u64) -> Day {
    Day::try_from(secs / SECONDS_PER_DAY).unwrap_or(Day::MAX)
}

/// Host wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Day {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        day_from_unix_seconds(secs)
    }
}

/// Injected day counter. Clones share the same underlying day, so a test
/// or host can keep a handle and advance the clock the engine reads.
#[derive(Debug, Clone)]
pub struct ManualClock {
    day: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new(day: Day) -> Self {
        Self {
            day: Arc::new(AtomicU32::new(day)),
        }
    }

    /// Moves the clock forward to `day`. Earlier days are ignored so the
    /// observed day never decreases.
    pub fn advance_to(&self, day: Day) {
        self.day.fetch_max(day, Ordering::SeqCst);
    }

    /// Moves the clock forward by `days`.
    pub fn advance_by(&self, days: Day) {
        let next = self.today().saturating_add(days);
        self.advance_to(next);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> Day {
        self.day.load(Ordering::SeqCst)
    }
}
