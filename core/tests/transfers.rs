//! User-to-user transfer tests — the sliding-window quota and its
//! retention cleanup.

use coinpit_core::{
    engine::EconEngine,
    error::EconError,
    ledger::{Category, Ledger, Party},
    EconCommand, EconOutcome,
};

const T0: i64 = 1_700_000_000;

fn build() -> EconEngine {
    EconEngine::build_test(T0, 19).expect("build test engine")
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

fn transfer_cmd(to: &str, amount: i128) -> EconCommand {
    EconCommand::Transfer {
        to: to.to_string(),
        amount,
        memo: None,
    }
}

#[test]
fn transfers_inside_the_window_are_capped() {
    let mut engine = build();
    fund(&engine, "alice", 1_000);
    fund(&engine, "bob", 1);
    let quota = engine.config.transfer_window_quota;

    for n in 1..=quota {
        let outcome = engine
            .dispatch("alice", &transfer_cmd("bob", 10))
            .expect("transfer within quota");
        match outcome {
            EconOutcome::Transferred(t) => assert_eq!(t.window_used, n),
            other => panic!("expected Transferred, got {other:?}"),
        }
    }

    let err = engine
        .dispatch("alice", &transfer_cmd("bob", 10))
        .expect_err("over quota");
    assert!(
        matches!(err, EconError::QuotaExceeded { used, limit } if used == quota && limit == quota),
        "got {err:?}"
    );
    assert_eq!(
        engine.store.balance_of("alice").unwrap(),
        Some(1_000 - 10 * quota as i128)
    );
}

#[test]
fn the_window_slides_on_elapsed_time() {
    let mut engine = build();
    fund(&engine, "alice", 1_000);
    fund(&engine, "bob", 1);
    let quota = engine.config.transfer_window_quota;

    for _ in 0..quota {
        engine
            .dispatch("alice", &transfer_cmd("bob", 10))
            .expect("fill quota");
    }
    engine
        .dispatch("alice", &transfer_cmd("bob", 10))
        .expect_err("full window");

    // Once the earliest timestamps age out, capacity returns.
    engine.clock.advance(engine.config.transfer_window_secs + 1);
    engine
        .dispatch("alice", &transfer_cmd("bob", 10))
        .expect("window slid");
}

#[test]
fn recipient_must_already_exist() {
    let mut engine = build();
    fund(&engine, "alice", 100);

    let err = engine
        .dispatch("alice", &transfer_cmd("ghost", 10))
        .expect_err("unknown recipient");
    assert!(matches!(err, EconError::NotFound { .. }), "got {err:?}");
    assert_eq!(engine.store.balance_of("alice").unwrap(), Some(100));
}

#[test]
fn self_transfer_is_refused() {
    let mut engine = build();
    fund(&engine, "alice", 100);

    let err = engine
        .dispatch("alice", &transfer_cmd("alice", 10))
        .expect_err("self transfer");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");
}

#[test]
fn failed_transfer_consumes_no_window_slot() {
    let mut engine = build();
    fund(&engine, "alice", 15);
    fund(&engine, "bob", 1);

    // Runs out of coins long before the quota; the refusals must not
    // eat window slots.
    engine
        .dispatch("alice", &transfer_cmd("bob", 10))
        .expect("first transfer");
    for _ in 0..3 {
        let err = engine
            .dispatch("alice", &transfer_cmd("bob", 10))
            .expect_err("broke");
        assert!(matches!(err, EconError::InsufficientFunds { .. }), "got {err:?}");
    }

    fund(&engine, "alice", 100);
    let outcome = engine
        .dispatch("alice", &transfer_cmd("bob", 10))
        .expect("still under quota");
    match outcome {
        EconOutcome::Transferred(t) => assert_eq!(t.window_used, 2),
        other => panic!("expected Transferred, got {other:?}"),
    }
}

#[test]
fn tick_prunes_aged_window_rows() {
    let mut engine = build();
    fund(&engine, "alice", 1_000);
    fund(&engine, "bob", 1);

    for _ in 0..3 {
        engine
            .dispatch("alice", &transfer_cmd("bob", 10))
            .expect("transfer");
    }
    engine.clock.advance(engine.config.transfer_window_secs + 1);
    let report = engine.tick().expect("tick");
    assert_eq!(report.window_rows_pruned, 3, "retention dropped the aged rows");
}
