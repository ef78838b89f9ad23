//! Arrest engine tests — eligibility, duration parsing bounds, lazy
//! release, and the officer cooldown.

use coinpit_core::{
    arrest::Arrests,
    engine::EconEngine,
    error::EconError,
    privilege::{PrivilegeKind, PrivilegeStore},
};

const T0: i64 = 1_700_000_000;

fn build() -> EconEngine {
    EconEngine::build_test(T0, 5).expect("build test engine")
}

fn grant(engine: &EconEngine, account: &str, kind: PrivilegeKind) {
    PrivilegeStore::new(&engine.store, &engine.clock)
        .grant(account, kind, None)
        .expect("grant privilege");
}

#[test]
fn officer_needs_police_privilege() {
    let engine = build();
    grant(&engine, "thug", PrivilegeKind::Thief);

    let err = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("wannabe", "thug", "1h")
        .expect_err("no police privilege");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");
}

#[test]
fn target_without_thief_privilege_is_refused() {
    let engine = build();
    grant(&engine, "officer", PrivilegeKind::Police);

    let err = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "civilian", "1h")
        .expect_err("civilian target");
    assert!(matches!(err, EconError::PermissionDenied { .. }), "got {err:?}");
    assert!(
        !Arrests::new(&engine.store, &engine.config, &engine.clock)
            .is_arrested("civilian")
            .unwrap(),
        "refusal must leave no state"
    );
}

#[test]
fn duration_is_parsed_clamped_and_defaulted() {
    let mut engine = build();
    grant(&engine, "officer", PrivilegeKind::Police);
    grant(&engine, "thug", PrivilegeKind::Thief);
    let cooldown = engine.config.police_cooldown_secs;

    let outcome = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug", "2h30m")
        .expect("arrest");
    assert_eq!(outcome.minutes, 150);
    assert_eq!(outcome.release_at, engine.clock.now() + 150 * 60);

    // Unparseable input falls back to the 180-minute default.
    engine.clock.advance(cooldown + 150 * 60);
    let outcome = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug", "until further notice")
        .expect("arrest with default duration");
    assert_eq!(outcome.minutes, 180);

    // Oversized requests clamp to a day; undersized to a minute.
    engine.clock.advance(cooldown + 180 * 60);
    let outcome = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug", "99d")
        .expect("clamped arrest");
    assert_eq!(outcome.minutes, 1_440);

    engine.clock.advance(cooldown + 1_440 * 60);
    let outcome = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug", "0m")
        .expect("minimum arrest");
    assert_eq!(outcome.minutes, 1);
}

#[test]
fn already_arrested_target_is_rejected() {
    let engine = build();
    grant(&engine, "officer", PrivilegeKind::Police);
    grant(&engine, "partner", PrivilegeKind::Police);
    grant(&engine, "thug", PrivilegeKind::Thief);

    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug", "3h")
        .expect("first arrest");
    let err = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("partner", "thug", "1h")
        .expect_err("already arrested");
    assert!(matches!(err, EconError::AlreadyInState { .. }), "got {err:?}");
}

#[test]
fn release_is_lazy_and_a_new_arrest_then_succeeds() {
    let mut engine = build();
    grant(&engine, "officer", PrivilegeKind::Police);
    grant(&engine, "partner", PrivilegeKind::Police);
    grant(&engine, "thug", PrivilegeKind::Thief);

    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug", "30m")
        .expect("arrest");
    assert!(Arrests::new(&engine.store, &engine.config, &engine.clock)
        .is_arrested("thug")
        .unwrap());

    // Past the release time the record reads as absent — no sweep ran.
    engine.clock.advance(31 * 60);
    assert!(!Arrests::new(&engine.store, &engine.config, &engine.clock)
        .is_arrested("thug")
        .unwrap());

    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("partner", "thug", "1h")
        .expect("slot is free again");
}

#[test]
fn officer_cooldown_is_per_officer_not_per_target() {
    let mut engine = build();
    grant(&engine, "officer", PrivilegeKind::Police);
    grant(&engine, "thug_a", PrivilegeKind::Thief);
    grant(&engine, "thug_b", PrivilegeKind::Thief);

    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug_a", "1h")
        .expect("first arrest");
    let err = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug_b", "1h")
        .expect_err("different target, same officer");
    match err {
        EconError::CooldownActive { remaining_secs } => {
            assert_eq!(remaining_secs, engine.config.police_cooldown_secs);
        }
        other => panic!("expected CooldownActive, got {other:?}"),
    }

    engine.clock.advance(engine.config.police_cooldown_secs);
    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug_b", "1h")
        .expect("cooldown elapsed");
}

#[test]
fn sweep_clears_only_released_rows() {
    let mut engine = build();
    grant(&engine, "officer", PrivilegeKind::Police);
    grant(&engine, "partner", PrivilegeKind::Police);
    grant(&engine, "thug_a", PrivilegeKind::Thief);
    grant(&engine, "thug_b", PrivilegeKind::Thief);

    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("officer", "thug_a", "10m")
        .expect("short arrest");
    Arrests::new(&engine.store, &engine.config, &engine.clock)
        .arrest("partner", "thug_b", "4h")
        .expect("long arrest");

    engine.clock.advance(30 * 60);
    let swept = Arrests::new(&engine.store, &engine.config, &engine.clock)
        .sweep_released()
        .expect("sweep");
    assert_eq!(swept, 1);
    assert!(Arrests::new(&engine.store, &engine.config, &engine.clock)
        .is_arrested("thug_b")
        .unwrap());
}
