//! econ-runner: headless driver for the coinpit economy core.
//!
//! Stands in for the Messaging Gateway + Scheduler collaborators:
//!   econ-runner --db econ.db --ipc-mode < commands.jsonl
//!   econ-runner --demo --seed 7
//!
//! IPC mode reads one JSON request per stdin line and writes one JSON
//! reply per line:
//!   {"type":"dispatch","actor":"alice","command":{"cmd":"balance"}}
//!   {"type":"tick"}
//!   {"type":"quit"}

use anyhow::Result;
use coinpit_core::{
    config::EconConfig,
    engine::EconEngine,
    games::DiceBet,
    privilege::{PrivilegeKind, PrivilegeStore},
    store::EconStore,
    EconCommand,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    Dispatch {
        actor: String,
        command: EconCommand,
    },
    Tick,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let seed = flag_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42u64);

    if args.iter().any(|a| a == "--demo") {
        return run_demo(seed);
    }

    let store = EconStore::open(db)?;
    store.migrate()?;
    log::info!("store ready at {db}");
    let config = match flag_value(&args, "--config") {
        Some(path) => EconConfig::from_json_file(path)?,
        None => EconConfig::default(),
    };
    let mut engine = EconEngine::new(store, config);
    run_ipc_loop(&mut engine)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn run_ipc_loop(engine: &mut EconEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();
    let mut handle = stdin.lock();

    loop {
        buffer.clear();
        if handle.read_line(&mut buffer)? == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match request {
            IpcRequest::Quit => break,
            IpcRequest::Tick => match engine.tick() {
                Ok(report) => serde_json::json!({ "ok": report }),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
            IpcRequest::Dispatch { actor, command } => match engine.dispatch(&actor, &command) {
                Ok(outcome) => serde_json::json!({ "ok": outcome }),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Scripted walkthrough over a deterministic in-memory engine: one
/// funded day of play for three users, ending in a printed summary.
fn run_demo(seed: u64) -> Result<()> {
    println!("coinpit — econ-runner demo (seed {seed})");
    println!("  started {}", chrono::Utc::now().to_rfc3339());
    println!();

    let mut engine = EconEngine::build_test(1_700_000_000, seed)?;

    // First interactions create the accounts; the first tick funds them.
    for actor in ["alice", "bob", "carol"] {
        engine.dispatch(actor, &EconCommand::Balance)?;
    }
    let report = engine.tick()?;
    println!("tick: {} bonus grants", report.bonuses_granted);

    // Stake the table a little.
    for actor in ["alice", "bob", "carol"] {
        let outcome = engine.dispatch(
            actor,
            &EconCommand::Dice {
                bet: DiceBet::Target { target: 7 },
                stake: 20,
            },
        )?;
        println!("{actor}: {}", serde_json::to_string(&outcome)?);
    }

    // Move coins sideways: a transfer and a theft. The demo grants
    // the thief privilege directly; real users buy it from the shop.
    engine.dispatch(
        "alice",
        &EconCommand::Transfer {
            to: "bob".to_string(),
            amount: 10,
            memo: Some("for lunch".to_string()),
        },
    )?;
    PrivilegeStore::new(&engine.store, &engine.clock).grant(
        "carol",
        PrivilegeKind::Thief,
        Some(24 * 3600),
    )?;
    match engine.dispatch(
        "carol",
        &EconCommand::Steal {
            victim: "bob".to_string(),
        },
    ) {
        Ok(outcome) => println!("carol steals from bob: {}", serde_json::to_string(&outcome)?),
        Err(e) => println!("carol steals from bob: {e}"),
    }

    println!();
    println!("final balances:");
    for actor in ["alice", "bob", "carol"] {
        let balance = engine.store.balance_of(actor)?.unwrap_or(0);
        println!("  {actor:<8} {balance}");
    }
    println!("ledger entries: {}", engine.store.ledger_entry_count()?);
    Ok(())
}
