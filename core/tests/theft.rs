//! Theft engine tests — rate math, quota, refusal ordering, and the
//! zero-spoils case.

use coinpit_core::{
    engine::EconEngine,
    error::EconError,
    ledger::{Category, Ledger, Party},
    privilege::{PrivilegeKind, PrivilegeStore},
    theft::Theft,
};

const T0: i64 = 1_700_000_000;
const DAY: i64 = 24 * 3600;

fn build() -> EconEngine {
    EconEngine::build_test(T0, 3).expect("build test engine")
}

fn fund(engine: &EconEngine, account: &str, amount: i128) {
    Ledger::new(&engine.store, &engine.clock)
        .transfer(
            &Party::System,
            &Party::account(account),
            amount,
            Category::Bonus,
            Some("test funding"),
        )
        .expect("fund account");
}

fn make_thief(engine: &EconEngine, account: &str) {
    PrivilegeStore::new(&engine.store, &engine.clock)
        .grant(account, PrivilegeKind::Thief, Some(30 * DAY))
        .expect("grant thief");
}

#[test]
fn successful_theft_moves_the_rate_and_counts() {
    let engine = build();
    make_thief(&engine, "carol");
    fund(&engine, "victim", 1_000);

    let outcome = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect("steal");

    assert_eq!(outcome.amount, 100, "10% of 1000");
    assert_eq!(outcome.quota_used, 1);
    assert_eq!(engine.store.balance_of("victim").unwrap(), Some(900));
    assert_eq!(engine.store.balance_of("carol").unwrap(), Some(100));
}

#[test]
fn spoils_are_floored() {
    let engine = build();
    make_thief(&engine, "carol");
    fund(&engine, "victim", 1_234);

    let outcome = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect("steal");

    assert_eq!(outcome.amount, 123, "floor(1234 * 0.1)");
}

#[test]
fn fourth_attempt_in_a_day_hits_the_quota() {
    let engine = build();
    make_thief(&engine, "carol");
    fund(&engine, "victim", 1_000);
    let theft = Theft::new(&engine.store, &engine.config, &engine.clock);

    for n in 1..=3 {
        let outcome = theft.attempt("carol", "victim").expect("steal within quota");
        assert_eq!(outcome.quota_used, n);
    }
    let victim_before = engine.store.balance_of("victim").unwrap();
    let thief_before = engine.store.balance_of("carol").unwrap();

    let err = theft.attempt("carol", "victim").expect_err("fourth must fail");
    assert!(
        matches!(err, EconError::QuotaExceeded { used: 3, limit: 3 }),
        "got {err:?}"
    );
    assert_eq!(engine.store.balance_of("victim").unwrap(), victim_before);
    assert_eq!(engine.store.balance_of("carol").unwrap(), thief_before);
}

#[test]
fn quota_resets_on_elapsed_day_not_calendar() {
    let mut engine = build();
    make_thief(&engine, "carol");
    fund(&engine, "victim", 10_000);

    {
        let theft = Theft::new(&engine.store, &engine.config, &engine.clock);
        for _ in 0..3 {
            theft.attempt("carol", "victim").expect("steal");
        }
        theft.attempt("carol", "victim").expect_err("quota full");
    }

    // 23h59m is still the same rolling day; 24h is not.
    engine.clock.advance(DAY - 60);
    Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect_err("still inside the rolling day");
    engine.clock.advance(60);
    let outcome = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect("fresh day");
    assert_eq!(outcome.quota_used, 1);
}

#[test]
fn zero_spoils_is_no_effect_and_spares_the_quota() {
    let engine = build();
    make_thief(&engine, "carol");
    fund(&engine, "pauper", 5); // 10% floors to 0

    let theft = Theft::new(&engine.store, &engine.config, &engine.clock);
    let err = theft.attempt("carol", "pauper").expect_err("nothing to take");
    assert!(matches!(err, EconError::NoEffect), "got {err:?}");
    assert_eq!(engine.store.balance_of("pauper").unwrap(), Some(5));

    // The failed attempt consumed no quota.
    fund(&engine, "pauper", 995);
    let outcome = theft.attempt("carol", "pauper").expect("steal");
    assert_eq!(outcome.quota_used, 1);
}

#[test]
fn refusals_in_order() {
    let mut engine = build();
    fund(&engine, "victim", 1_000);

    // No thief privilege.
    let err = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect_err("no privilege");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");

    make_thief(&engine, "carol");
    fund(&engine, "carol", 50);

    // Self-theft.
    let err = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "carol")
        .expect_err("self");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");

    // Police-protected victim.
    PrivilegeStore::new(&engine.store, &engine.clock)
        .grant("victim", PrivilegeKind::Police, Some(DAY))
        .expect("grant police");
    let err = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect_err("protected");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");

    // Protection lapses with the privilege — read-time expiry, no
    // sweep needed.
    engine.clock.advance(DAY + 1);
    Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect("protection expired");
}

#[test]
fn arrested_thief_cannot_steal() {
    let engine = build();
    make_thief(&engine, "carol");
    fund(&engine, "victim", 1_000);
    PrivilegeStore::new(&engine.store, &engine.clock)
        .grant("officer", PrivilegeKind::Police, None)
        .expect("grant police");
    coinpit_core::arrest::Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "carol", "3h")
        .expect("arrest");

    let err = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "victim")
        .expect_err("arrested");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");
    assert_eq!(engine.store.balance_of("victim").unwrap(), Some(1_000));
}

#[test]
fn unknown_victim_is_not_found() {
    let engine = build();
    make_thief(&engine, "carol");

    let err = Theft::new(&engine.store, &engine.config, &engine.clock)
        .attempt("carol", "ghost")
        .expect_err("no such account");
    assert!(matches!(err, EconError::NotFound { .. }), "got {err:?}");
}
