//! coinpit-core — the economy consistency core of a chat currency game.
//!
//! Users accumulate coins through games of chance, transfer them,
//! steal them from each other, and spend them on time-limited
//! privileges. This crate owns every invariant around coin movement;
//! the chat frontend is a separate Messaging Gateway collaborator
//! that feeds decoded commands in and renders structured outcomes
//! back out.
//!
//! RULES:
//!   - Balances change only through the Ledger. One movement = one
//!     balance pair update + one append-only entry, committed together.
//!   - Authorization reads may be stale; every mutating transaction
//!     re-validates its invariants under the write lock.
//!   - Expiry (privileges, arrests, requests) is checked at read time.
//!     Sweeps are storage hygiene, never correctness.

pub mod arrest;
pub mod bonus;
pub mod clock;
pub mod command;
pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod games;
pub mod ledger;
pub mod privilege;
pub mod relationship;
pub mod rng;
pub mod store;
pub mod theft;
pub mod types;

pub use command::{EconCommand, EconOutcome};
pub use engine::EconEngine;
pub use error::{EconError, EconResult};
