//! VestingLedger v1: State Construction

use std::collections::{BTreeMap, BTreeSet};

use crate::config::TokenConfig;
use crate::domain::{Account, GrantorRole, LedgerState, RoleState};

/// Fresh ledger: the whole initial supply sits with the registered owner,
/// who is also seeded as a standard grantor and a pauser.
pub fn create_initial_state(config: &TokenConfig) -> LedgerState {
    let supply = config.initial_supply_units();

    let mut accounts = BTreeMap::new();
    accounts.insert(
        config.owner.clone(),
        Account {
            balance: supply,
            registered: true,
            ..Default::default()
        },
    );

    let mut grantors = BTreeMap::new();
    grantors.insert(config.owner.clone(), GrantorRole::Standard);
    let mut pausers = BTreeSet::new();
    pausers.insert(config.owner.clone());

    LedgerState {
        token: config.token_info(),
        accounts,
        total_supply: supply,
        roles: RoleState {
            owner: config.owner.clone(),
            grantors,
            pausers,
            uniform_schedules: BTreeMap::new(),
        },
        paused: false,
        killed: false,
    }
}
