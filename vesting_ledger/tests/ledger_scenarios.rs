//! End-to-end scenarios through the public engine surface.

use vesting_ledger::arithmetic::tokens;
use vesting_ledger::clock::{ManualClock, JAN_1_2000_DAY};
use vesting_ledger::config::TokenConfig;
use vesting_ledger::domain::{Amount, Day, GrantorRestrictions, VestingSchedule, VestingStatus};
use vesting_ledger::hashing::canonical_hash;
use vesting_ledger::{ErrorKind, LedgerError, TokenEngine};

const TODAY: Day = JAN_1_2000_DAY + 9000;

fn schedule(duration: Day, cliff: Day, interval: Day, revocable: bool) -> VestingSchedule {
    VestingSchedule {
        duration,
        cliff_duration: cliff,
        interval,
        is_revocable: revocable,
    }
}

fn setup() -> (TokenEngine, ManualClock) {
    let clock = ManualClock::new(TODAY);
    let engine = TokenEngine::new(&TokenConfig::default(), clock.clone());
    (engine, clock)
}

fn sum_of_balances(engine: &TokenEngine) -> Amount {
    engine.state().accounts.values().map(|a| a.balance).sum()
}

// ---------------------------------------------------------------------------
// Scenario A: step vesting with a free remainder
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_quarterly_steps_and_free_remainder() {
    let (mut e, clock) = setup();
    let d = TODAY;
    e.grant_vesting_tokens("owner", "alice", 1001, 1000, d, schedule(12, 0, 3, true))
        .unwrap();

    assert_eq!(e.transferable_balance_of("alice").unwrap(), 1);
    assert_eq!(e.vesting_as_of("alice", d + 3).unwrap().vested, 250);
    assert_eq!(e.vesting_as_of("alice", d + 12).unwrap().vested, 1000);

    clock.advance_to(d + 3);
    assert_eq!(e.transferable_balance_of("alice").unwrap(), 251);
    clock.advance_to(d + 12);
    assert_eq!(e.transferable_balance_of("alice").unwrap(), 1001);
    e.transfer("alice", "bob", 1001).unwrap();
    assert_eq!(e.balance_of("bob").unwrap(), 1001);
}

// ---------------------------------------------------------------------------
// Scenario B: one active grant per beneficiary
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_duplicate_then_regrant_after_revoke() {
    let (mut e, _) = setup();
    e.grant_vesting_tokens("owner", "alice", tokens(10), tokens(10), TODAY, schedule(12, 0, 1, true))
        .unwrap();
    assert_eq!(
        e.grant_vesting_tokens("owner", "alice", tokens(1), tokens(1), TODAY, schedule(12, 0, 1, true)),
        Err(LedgerError::DuplicateGrant("alice".into()))
    );
    e.revoke_grant("owner", "alice", TODAY).unwrap();
    e.grant_vesting_tokens("owner", "alice", tokens(1), tokens(1), TODAY, schedule(12, 0, 1, true))
        .unwrap();
    assert!(e.vesting_as_of("alice", TODAY).unwrap().is_active);
}

// ---------------------------------------------------------------------------
// Scenario C: revocation window
// ---------------------------------------------------------------------------

#[test]
fn scenario_c_revocation_window_is_closed_at_both_ends() {
    let (mut e, _) = setup();
    let start = TODAY + 10;
    e.grant_vesting_tokens("owner", "alice", tokens(100), tokens(100), start, schedule(12, 0, 1, true))
        .unwrap();
    let before = canonical_hash(e.state());

    for day in [start - 1, start + 12, start + 400] {
        let err = e.revoke_grant("owner", "alice", day).unwrap_err();
        assert!(matches!(err, LedgerError::RevocationWindowClosed { .. }));
        assert_eq!(err.kind(), ErrorKind::Revocation);
    }
    assert_eq!(canonical_hash(e.state()), before);

    let returned = e.revoke_grant("owner", "alice", start + 11).unwrap();
    assert_eq!(returned, tokens(100) - tokens(100) * 11 / 12);
}

#[test]
fn revocation_cannot_reach_into_the_past() {
    let (mut e, clock) = setup();
    e.grant_vesting_tokens("owner", "alice", tokens(12), tokens(12), TODAY, schedule(12, 0, 1, true))
        .unwrap();
    clock.advance_to(TODAY + 5);
    assert!(matches!(
        e.revoke_grant("owner", "alice", TODAY + 4),
        Err(LedgerError::RevocationWindowClosed { .. })
    ));
    assert_eq!(e.revoke_grant("owner", "alice", TODAY + 5).unwrap(), tokens(7));
}

#[test]
fn revocation_conserves_and_closes_grant() {
    let (mut e, _) = setup();
    let owner_before = e.balance_of("owner").unwrap();
    e.grant_vesting_tokens("owner", "alice", tokens(20), tokens(12), TODAY, schedule(12, 3, 1, true))
        .unwrap();
    e.approve("alice", "owner", tokens(8)).unwrap();

    let returned = e.revoke_grant("owner", "alice", TODAY + 4).unwrap();
    assert_eq!(returned, tokens(8));
    assert_eq!(e.balance_of("alice").unwrap(), tokens(12));
    assert_eq!(e.balance_of("owner").unwrap(), owner_before - tokens(12));
    assert_eq!(sum_of_balances(&e), e.total_supply().unwrap());

    let status = e.vesting_as_of("alice", TODAY + 4).unwrap();
    assert_eq!(
        status,
        VestingStatus {
            start_day: TODAY,
            duration: 12,
            cliff_duration: 3,
            interval: 1,
            is_active: false,
            was_revoked: true,
            ..Default::default()
        }
    );
    assert_eq!(e.transferable_balance_of("alice").unwrap(), tokens(12));
    assert_eq!(e.allowance("owner", "alice").unwrap(), 0);
    assert_eq!(
        e.revoke_grant("owner", "alice", TODAY + 5),
        Err(LedgerError::NoActiveGrant("alice".into()))
    );
}

#[test]
fn irrevocable_grant_and_foreign_revoker() {
    let (mut e, _) = setup();
    e.register_account("g").unwrap();
    e.add_grantor("owner", "g", false).unwrap();
    e.transfer("owner", "g", tokens(100)).unwrap();
    e.grant_vesting_tokens("g", "alice", tokens(10), tokens(10), TODAY, schedule(12, 0, 1, false))
        .unwrap();
    e.grant_vesting_tokens("owner", "bob", tokens(10), tokens(10), TODAY, schedule(12, 0, 1, true))
        .unwrap();

    assert_eq!(e.revoke_grant("g", "alice", TODAY), Err(LedgerError::NotRevocable));
    assert!(matches!(
        e.revoke_grant("g", "bob", TODAY),
        Err(LedgerError::NotAuthorized(_))
    ));
    assert!(matches!(
        e.revoke_grant("mallory", "bob", TODAY),
        Err(LedgerError::NotAuthorized(_))
    ));
}

// ---------------------------------------------------------------------------
// Scenario D: burn only the vested, free part
// ---------------------------------------------------------------------------

#[test]
fn scenario_d_burn_exactly_the_free_portion() {
    let (mut e, _) = setup();
    e.grant_vesting_tokens(
        "owner",
        "alice",
        tokens(1_000_000),
        tokens(1_000_000),
        TODAY - 6,
        schedule(12, 3, 1, true),
    )
    .unwrap();
    let supply = e.total_supply().unwrap();

    assert!(matches!(
        e.burn("alice", tokens(500_001)),
        Err(LedgerError::InsufficientBalance { .. })
    ));
    e.burn("alice", tokens(500_000)).unwrap();
    assert_eq!(e.total_supply().unwrap(), supply - tokens(500_000));
    assert_eq!(sum_of_balances(&e), e.total_supply().unwrap());
}

// ---------------------------------------------------------------------------
// Scenario E: uniform grantor window vs. owner
// ---------------------------------------------------------------------------

fn uniform_setup(e: &mut TokenEngine) {
    e.register_account("grantor").unwrap();
    e.add_grantor("owner", "grantor", true).unwrap();
    e.set_restrictions(
        "owner",
        "grantor",
        GrantorRestrictions {
            min_start_day: TODAY,
            max_start_day: TODAY + 30,
            expiration_day: TODAY + 365,
        },
    )
    .unwrap();
    e.set_grantor_vesting_schedule("owner", "grantor", schedule(12, 3, 1, true))
        .unwrap();
    e.transfer("owner", "grantor", tokens(100_000_000)).unwrap();
}

#[test]
fn scenario_e_uniform_window_binds_grantor_not_owner() {
    let (mut e, _) = setup();
    uniform_setup(&mut e);

    let outside = TODAY + 31;
    assert!(matches!(
        e.grant_uniform_vesting_tokens("grantor", "alice", tokens(2), tokens(1), outside),
        Err(LedgerError::OutsideRestrictionWindow(_))
    ));
    e.grant_vesting_tokens("owner", "alice", tokens(2), tokens(1), outside, schedule(12, 3, 1, true))
        .unwrap();
}

#[test]
fn uniform_grants_then_partial_revocation() {
    let (mut e, _) = setup();
    uniform_setup(&mut e);
    e.register_account("beneficiary1").unwrap();

    e.safe_grant_uniform_vesting_tokens("grantor", "beneficiary1", tokens(2_000_000), tokens(1_000_000), TODAY)
        .unwrap();
    assert_eq!(
        e.safe_grant_uniform_vesting_tokens("grantor", "beneficiary2", tokens(2_000_000), tokens(1_000_000), TODAY),
        Err(LedgerError::AccountNotRegistered("beneficiary2".into()))
    );
    e.grant_uniform_vesting_tokens("grantor", "beneficiary2", tokens(2_000_000), tokens(1_000_000), TODAY)
        .unwrap();
    e.revoke_grant("grantor", "beneficiary2", TODAY + 5).unwrap();

    assert_eq!(
        e.balance_of("grantor").unwrap(),
        96_583_333_333_333_333_333_333_334
    );
    let status = e.vesting_for_account_as_of("grantor", "beneficiary1", TODAY + 5).unwrap();
    assert_eq!(status.vested, 416_666_666_666_666_666_666_666);
    assert_eq!(status.not_vested, 583_333_333_333_333_333_333_334);
}

#[test]
fn uniform_grantor_cannot_use_standard_entry_or_configure_itself() {
    let (mut e, _) = setup();
    uniform_setup(&mut e);
    assert!(matches!(
        e.grant_vesting_tokens("grantor", "alice", 2, 1, TODAY, schedule(12, 3, 1, true)),
        Err(LedgerError::NotAuthorized(_))
    ));
    assert!(matches!(
        e.set_restrictions(
            "grantor",
            "grantor",
            GrantorRestrictions {
                min_start_day: TODAY,
                max_start_day: TODAY,
                expiration_day: TODAY + 1
            }
        ),
        Err(LedgerError::NotAuthorized(_))
    ));
    assert_eq!(
        e.set_grantor_vesting_schedule("owner", "grantor", schedule(24, 0, 1, false)),
        Err(LedgerError::ScheduleAlreadyExists("grantor".into()))
    );
}

#[test]
fn uniform_schedule_cannot_be_reset_by_readding_grantor() {
    let (mut e, _) = setup();
    uniform_setup(&mut e);
    let replacement = schedule(24, 0, 1, false);

    e.add_grantor("owner", "grantor", true).unwrap();
    assert_eq!(
        e.set_grantor_vesting_schedule("owner", "grantor", replacement),
        Err(LedgerError::ScheduleAlreadyExists("grantor".into()))
    );

    e.remove_grantor("owner", "grantor").unwrap();
    e.add_grantor("owner", "grantor", true).unwrap();
    assert_eq!(
        e.set_grantor_vesting_schedule("owner", "grantor", replacement),
        Err(LedgerError::ScheduleAlreadyExists("grantor".into()))
    );

    let config = e.grantor_restrictions("grantor").unwrap().unwrap();
    assert_eq!(config.schedule, Some(schedule(12, 3, 1, true)));
    // Restrictions are dropped on removal and must be set again.
    assert_eq!(
        e.grant_uniform_vesting_tokens("grantor", "alice", tokens(2), tokens(1), TODAY),
        Err(LedgerError::GrantorNotReady("grantor".into()))
    );
    e.set_restrictions(
        "owner",
        "grantor",
        GrantorRestrictions {
            min_start_day: TODAY,
            max_start_day: TODAY,
            expiration_day: TODAY + 1,
        },
    )
    .unwrap();
    e.grant_uniform_vesting_tokens("grantor", "alice", tokens(2), tokens(1), TODAY)
        .unwrap();
    assert_eq!(e.state().grant_of("alice").unwrap().schedule, schedule(12, 3, 1, true));
}

// ---------------------------------------------------------------------------
// Grant preconditions
// ---------------------------------------------------------------------------

#[test]
fn grant_preconditions() {
    let (mut e, _) = setup();
    assert_eq!(
        e.grant_vesting_tokens("owner", "a", 1, 2, TODAY, schedule(12, 0, 1, true)),
        Err(LedgerError::VestingExceedsTotal { vesting: 2, total: 1 })
    );
    assert!(matches!(
        e.grant_vesting_tokens("owner", "a", 2, 1, JAN_1_2000_DAY - 1, schedule(12, 0, 1, true)),
        Err(LedgerError::InvalidScheduleBounds(_))
    ));
    assert!(matches!(
        e.grant_vesting_tokens("owner", "a", 2, 1, TODAY, schedule(3653, 0, 1, true)),
        Err(LedgerError::InvalidScheduleBounds(_))
    ));
    assert!(matches!(
        e.grant_vesting_tokens("nobody", "a", 2, 1, TODAY, schedule(12, 0, 1, true)),
        Err(LedgerError::NotAuthorized(_))
    ));
    let too_much = e.total_supply().unwrap() + 1;
    assert!(matches!(
        e.grant_vesting_tokens("owner", "a", too_much, 1, TODAY, schedule(12, 0, 1, true)),
        Err(LedgerError::InsufficientIssuerBalance { .. })
    ));
}

#[test]
fn vesting_query_authorization() {
    let (mut e, _) = setup();
    e.register_account("g").unwrap();
    e.add_grantor("owner", "g", false).unwrap();
    e.transfer("owner", "g", tokens(10)).unwrap();
    e.grant_vesting_tokens("g", "alice", tokens(10), tokens(10), TODAY, schedule(12, 0, 1, true))
        .unwrap();

    assert!(e.vesting_for_account_as_of("alice", "alice", TODAY).is_ok());
    assert!(e.vesting_for_account_as_of("g", "alice", TODAY).is_ok());
    assert!(e.vesting_for_account_as_of("owner", "alice", TODAY).is_ok());
    assert!(matches!(
        e.vesting_for_account_as_of("bob", "alice", TODAY),
        Err(LedgerError::NotAuthorized(_))
    ));
    assert_eq!(e.vesting_as_of("bob", TODAY).unwrap(), VestingStatus::default());
}

// ---------------------------------------------------------------------------
// Roles, pause, kill
// ---------------------------------------------------------------------------

#[test]
fn ownership_transfer_moves_privileges() {
    let (mut e, _) = setup();
    e.register_account("alice").unwrap();
    e.transfer_ownership("owner", "alice").unwrap();

    assert_eq!(e.owner().unwrap(), "alice");
    assert!(!e.is_owner("owner").unwrap());
    assert!(!e.is_grantor("owner").unwrap());
    assert!(!e.is_pauser("owner").unwrap());
    assert!(e.is_grantor("alice").unwrap());
    assert!(e.is_pauser("alice").unwrap());

    // The new owner may drop its own entries; nobody holds the roles then.
    e.remove_grantor("alice", "alice").unwrap();
    e.remove_pauser("alice", "alice").unwrap();
    assert!(!e.is_grantor("alice").unwrap());
    assert!(!e.is_pauser("alice").unwrap());
    assert!(!e.is_grantor("owner").unwrap());
    assert!(e.state().roles.grantors.is_empty());

    e.register_account("erin").unwrap();
    e.add_grantor("alice", "erin", false).unwrap();
    assert!(e.is_grantor("erin").unwrap());

    assert!(matches!(e.pause("owner"), Err(LedgerError::NotAuthorized(_))));
    e.pause("alice").unwrap();
    assert!(e.is_paused().unwrap());
    assert!(matches!(
        e.renounce_ownership("alice"),
        Err(LedgerError::NotAuthorized(_))
    ));
}

#[test]
fn paused_ledger_still_accepts_admin_calls() {
    let (mut e, _) = setup();
    e.pause("owner").unwrap();
    assert_eq!(e.transfer("owner", "bob", 1), Err(LedgerError::Paused));
    assert_eq!(
        e.grant_vesting_tokens("owner", "bob", 2, 1, TODAY, schedule(12, 0, 1, true)),
        Err(LedgerError::Paused)
    );
    e.register_account("bob").unwrap();
    e.add_pauser("owner", "bob").unwrap();
    e.set_display_name("bob", "Bob").unwrap();
    e.unpause("bob").unwrap();
    e.transfer("owner", "bob", 1).unwrap();
}

#[test]
fn kill_is_terminal() {
    let (mut e, _) = setup();
    e.add_pauser("owner", "p").unwrap();
    assert_eq!(e.kill("p"), Err(LedgerError::NotPaused));
    assert!(matches!(e.kill("bob"), Err(LedgerError::NotAuthorized(_))));
    e.pause("p").unwrap();
    e.kill("p").unwrap();
    assert_eq!(e.total_supply(), Err(LedgerError::Killed));
    assert_eq!(e.name(), Err(LedgerError::Killed));
    assert_eq!(e.is_paused(), Err(LedgerError::Killed));
    assert_eq!(e.unpause("p"), Err(LedgerError::Killed));
}

// ---------------------------------------------------------------------------
// Registry and metadata
// ---------------------------------------------------------------------------

#[test]
fn registry_and_metadata() {
    let (mut e, clock) = setup();
    assert_eq!(e.name().unwrap(), "CPUcoin");
    assert_eq!(e.symbol().unwrap(), "CPU");
    assert_eq!(e.decimals().unwrap(), 18);
    assert_eq!(e.today().unwrap(), TODAY);
    clock.advance_by(2);
    assert_eq!(e.today().unwrap(), TODAY + 2);

    assert!(!e.is_registered("bob").unwrap());
    e.register_account("bob").unwrap();
    assert!(e.is_registered("bob").unwrap());
    e.set_display_name("bob", "Bob the builder").unwrap();
    assert_eq!(e.who_am_i("bob").unwrap(), "Bob the builder");
    assert_eq!(e.where_am_i("bob").unwrap(), "bob");
    assert!(matches!(
        e.set_display_name("bob", &"x".repeat(33)),
        Err(LedgerError::DisplayNameTooLong { len: 33 })
    ));

    assert_eq!(
        e.safe_transfer("owner", "carol", 1),
        Err(LedgerError::AccountNotRegistered("carol".into()))
    );
    e.safe_transfer("owner", "bob", 1).unwrap();
}

#[test]
fn conservation_across_a_mixed_run() {
    let (mut e, clock) = setup();
    let supply = e.total_supply().unwrap();
    e.transfer("owner", "a", tokens(1000)).unwrap();
    e.grant_vesting_tokens("owner", "b", tokens(500), tokens(400), TODAY, schedule(100, 10, 10, true))
        .unwrap();
    e.approve("a", "c", tokens(300)).unwrap();
    e.transfer_from("c", "a", "d", tokens(250)).unwrap();
    clock.advance_to(TODAY + 35);
    e.transfer("b", "d", tokens(100)).unwrap();
    e.revoke_grant("owner", "b", TODAY + 40).unwrap();
    e.burn("d", tokens(50)).unwrap();

    assert_eq!(e.total_supply().unwrap(), supply - tokens(50));
    assert_eq!(sum_of_balances(&e), e.total_supply().unwrap());
    assert_eq!(e.allowance("a", "c").unwrap(), tokens(50));
}
