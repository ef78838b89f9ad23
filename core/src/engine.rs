//! The economy engine — command dispatch and the scheduler tick.
//!
//! DISPATCH RULES:
//!   - The actor's account is created lazily before any operation.
//!   - The system identity is never a valid actor.
//!   - Engines re-validate every critical invariant inside their own
//!     store transaction; dispatch-level reads are authorization only.
//!   - Notifications back to the Gateway are best-effort: failures
//!     are logged and swallowed, never propagated as economic errors.

use crate::{
    arrest::Arrests,
    bonus::BonusDistributor,
    clock::Clock,
    command::{EconCommand, EconOutcome},
    config::EconConfig,
    cooldown::ACTION_TRANSFER,
    error::{EconError, EconResult},
    games::Games,
    ledger::Ledger,
    privilege::PrivilegeStore,
    relationship::{RelationshipReply, Relationships, RequestKind},
    rng::TableRng,
    store::EconStore,
    theft::Theft,
    types::{UnixTime, SYSTEM_ACTOR},
};
use serde::Serialize;

/// Out-of-band delivery back to the Messaging Gateway.
pub trait Notifier: Send {
    fn notify(&self, account_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Default sink that drops every notice.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _account_id: &str, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// What one scheduler tick did.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub bonuses_granted: usize,
    pub privileges_swept: usize,
    pub arrests_released: usize,
    pub requests_expired: usize,
    pub window_rows_pruned: usize,
}

pub struct EconEngine {
    pub store: EconStore,
    pub config: EconConfig,
    pub clock: Clock,
    pub rng: TableRng,
    notifier: Box<dyn Notifier>,
}

impl EconEngine {
    pub fn new(store: EconStore, config: EconConfig) -> Self {
        Self {
            store,
            config,
            clock: Clock::system(),
            rng: TableRng::from_entropy(),
            notifier: Box::new(NullNotifier),
        }
    }

    /// Fully deterministic engine over an in-memory store: pinned
    /// clock, seeded rng. Used by tests and the demo runner.
    pub fn build_test(now: UnixTime, seed: u64) -> EconResult<Self> {
        let store = EconStore::in_memory()?;
        store.migrate()?;
        Ok(Self {
            store,
            config: EconConfig::default(),
            clock: Clock::fixed(now),
            rng: TableRng::seeded(seed),
            notifier: Box::new(NullNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Run one decoded command for `actor`.
    pub fn dispatch(&mut self, actor: &str, command: &EconCommand) -> EconResult<EconOutcome> {
        if actor == SYSTEM_ACTOR {
            return Err(EconError::denied("the system identity cannot act"));
        }
        // Lazy account creation on first interaction.
        {
            let txn = self.store.begin()?;
            txn.ensure_account(actor, self.clock.now())?;
            txn.commit()?;
        }

        match command {
            EconCommand::Balance => {
                let row = self
                    .store
                    .account(actor)?
                    .ok_or_else(|| EconError::missing(format!("account {actor}")))?;
                Ok(EconOutcome::Balance {
                    account: row.account_id,
                    balance: row.balance,
                    best_win: row.best_win,
                    worst_loss: row.worst_loss,
                })
            }

            EconCommand::Transfer { to, amount, memo } => Ledger::new(&self.store, &self.clock)
                .user_transfer(&self.config, actor, to, *amount, memo.as_deref())
                .map(EconOutcome::Transferred),

            EconCommand::Roulette { bet, stake } => {
                Games::new(&self.store, &self.config, &self.clock)
                    .play_roulette(&mut self.rng, actor, bet, *stake)
                    .map(EconOutcome::RouletteRound)
            }

            EconCommand::Dice { bet, stake } => Games::new(&self.store, &self.config, &self.clock)
                .play_dice(&mut self.rng, actor, bet, *stake)
                .map(EconOutcome::DiceRound),

            EconCommand::Steal { victim } => {
                let outcome =
                    Theft::new(&self.store, &self.config, &self.clock).attempt(actor, victim)?;
                self.notify(
                    victim,
                    &format!("{actor} stole {} coins from you", outcome.amount),
                );
                Ok(EconOutcome::Stolen(outcome))
            }

            EconCommand::Arrest { target, duration } => {
                let outcome = Arrests::new(&self.store, &self.config, &self.clock)
                    .arrest(actor, target, duration)?;
                self.notify(
                    target,
                    &format!("you were arrested for {} minutes", outcome.minutes),
                );
                Ok(EconOutcome::Arrested(outcome))
            }

            EconCommand::Buy { kind } => PrivilegeStore::new(&self.store, &self.clock)
                .purchase(&self.config, actor, *kind)
                .map(EconOutcome::Purchased),

            EconCommand::Propose { target } => {
                let request = Relationships::new(&self.store, &self.config, &self.clock)
                    .propose(actor, target)?;
                self.notify(target, &format!("{actor} proposed to you"));
                Ok(EconOutcome::ProposalSent {
                    target: request.responder,
                    expires_at: request.expires_at,
                })
            }

            EconCommand::RespondProposal { initiator, accept } => {
                let reply = Relationships::new(&self.store, &self.config, &self.clock).respond(
                    actor,
                    initiator,
                    RequestKind::Marriage,
                    *accept,
                )?;
                if matches!(reply, RelationshipReply::Married { .. }) {
                    self.notify(initiator, &format!("{actor} accepted your proposal"));
                }
                Ok(EconOutcome::Relationship(reply))
            }

            EconCommand::RequestDivorce => {
                let request =
                    Relationships::new(&self.store, &self.config, &self.clock).request_divorce(actor)?;
                self.notify(&request.responder, &format!("{actor} filed for divorce"));
                Ok(EconOutcome::DivorceRequested {
                    partner: request.responder,
                    expires_at: request.expires_at,
                })
            }

            EconCommand::RespondDivorce { initiator, accept } => {
                Relationships::new(&self.store, &self.config, &self.clock)
                    .respond(actor, initiator, RequestKind::Divorce, *accept)
                    .map(EconOutcome::Relationship)
            }
        }
    }

    /// Scheduler entry point: the bonus cycle plus hygiene sweeps.
    /// Idempotent at any cadence — correctness never depends on when
    /// or how often this runs.
    pub fn tick(&mut self) -> EconResult<TickReport> {
        let bonus = BonusDistributor::new(&self.store, &self.config, &self.clock).run_cycle()?;
        let privileges_swept = PrivilegeStore::new(&self.store, &self.clock).sweep_expired()?;
        let arrests_released =
            Arrests::new(&self.store, &self.config, &self.clock).sweep_released()?;
        let requests_expired =
            Relationships::new(&self.store, &self.config, &self.clock).sweep_expired_requests()?;
        // Window rows older than the window are retention, not
        // correction: dropping them never changes a quota decision.
        let cutoff = self.clock.now() - self.config.transfer_window_secs;
        let window_rows_pruned = self.store.prune_window(ACTION_TRANSFER, cutoff)?;

        let report = TickReport {
            bonuses_granted: bonus.grants_issued,
            privileges_swept,
            arrests_released,
            requests_expired,
            window_rows_pruned,
        };
        log::debug!(
            "tick: {} bonuses, swept {} privileges / {} arrests / {} requests",
            report.bonuses_granted,
            report.privileges_swept,
            report.arrests_released,
            report.requests_expired
        );
        Ok(report)
    }

    fn notify(&self, account_id: &str, text: &str) {
        if let Err(err) = self.notifier.notify(account_id, text) {
            log::warn!("notify {account_id} failed (dropped): {err:#}");
        }
    }
}
