//! Randomized invariant test — a seeded storm of transfers, rounds,
//! thefts, and ticks, then the two properties that must always hold:
//! no balance ever goes negative, and the sum of balances equals the
//! net coins the system side ever issued.

use coinpit_core::{
    engine::EconEngine,
    games::{Color, DiceBet, RouletteBet},
    privilege::{PrivilegeKind, PrivilegeStore},
    EconCommand,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

const T0: i64 = 1_700_000_000;
const ACTORS: [&str; 6] = ["alice", "bob", "carol", "dave", "erin", "frank"];

fn assert_invariants(engine: &EconEngine, step: usize) {
    for actor in ACTORS {
        let balance = engine.store.balance_of(actor).expect("read balance");
        assert!(
            balance.unwrap_or(0) >= 0,
            "step {step}: {actor} went negative: {balance:?}"
        );
    }
    let total = engine.store.sum_of_balances().expect("sum balances");
    let issued = engine.store.system_net_issued().expect("net issued");
    assert_eq!(
        total, issued,
        "step {step}: conservation broke — balances {total}, issued {issued}"
    );
}

#[test]
fn randomized_operation_storm_preserves_the_invariants() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = EconEngine::build_test(T0, 0xC0DE).expect("build test engine");
    let mut rng = Pcg64Mcg::seed_from_u64(0xC0DE);

    // Everyone exists; a couple of actors get the adversarial roles.
    for actor in ACTORS {
        engine.dispatch(actor, &EconCommand::Balance).expect("create");
    }
    let privileges = PrivilegeStore::new(&engine.store, &engine.clock);
    privileges
        .grant("carol", PrivilegeKind::Thief, None)
        .expect("thief carol");
    privileges
        .grant("dave", PrivilegeKind::Thief, None)
        .expect("thief dave");
    privileges
        .grant("erin", PrivilegeKind::Police, None)
        .expect("police erin");
    engine.tick().expect("seed funding tick");

    for step in 0..600 {
        let actor = ACTORS[rng.gen_range(0..ACTORS.len())];
        let other = ACTORS[rng.gen_range(0..ACTORS.len())];

        // Expected refusals (quota, funds, cooldowns, permissions)
        // are part of the storm; every one must be zero-effect, which
        // the conservation check below catches.
        match rng.gen_range(0..7u32) {
            0 => {
                let _ = engine.dispatch(
                    actor,
                    &EconCommand::Transfer {
                        to: other.to_string(),
                        amount: rng.gen_range(1..60) as i128,
                        memo: None,
                    },
                );
            }
            1 => {
                let _ = engine.dispatch(
                    actor,
                    &EconCommand::Roulette {
                        bet: RouletteBet::Color { color: Color::Red },
                        stake: rng.gen_range(1..40) as i128,
                    },
                );
            }
            2 => {
                let _ = engine.dispatch(
                    actor,
                    &EconCommand::Dice {
                        bet: DiceBet::Target {
                            target: rng.gen_range(1..=12),
                        },
                        stake: rng.gen_range(1..40) as i128,
                    },
                );
            }
            3 => {
                let _ = engine.dispatch(
                    actor,
                    &EconCommand::Steal {
                        victim: other.to_string(),
                    },
                );
            }
            4 => {
                let _ = engine.dispatch(
                    "erin",
                    &EconCommand::Arrest {
                        target: other.to_string(),
                        duration: "30m".to_string(),
                    },
                );
            }
            5 => {
                engine.tick().expect("tick");
            }
            _ => {
                engine.clock.advance(rng.gen_range(60..7200));
            }
        }

        if step % 50 == 0 {
            assert_invariants(&engine, step);
        }
    }

    assert_invariants(&engine, 600);

    // The storm actually moved coins.
    assert!(
        engine.store.ledger_entry_count().expect("entry count") > 100,
        "the storm should have produced real ledger traffic"
    );
}
