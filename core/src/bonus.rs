//! Scheduled per-account grant.
//!
//! One account = one transaction: the eligibility re-check, the
//! credit, and the `last_bonus_at` update commit together, so a crash
//! or an overlapping scheduler run can never duplicate a grant.

use crate::{
    clock::Clock,
    config::EconConfig,
    error::EconResult,
    ledger::{Category, Ledger, Party},
    store::EconStore,
    types::{Coins, UnixTime},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BonusReport {
    pub grants_issued: usize,
    pub coins_granted: Coins,
}

pub struct BonusDistributor<'a> {
    store: &'a EconStore,
    config: &'a EconConfig,
    clock: &'a Clock,
}

impl<'a> BonusDistributor<'a> {
    pub fn new(store: &'a EconStore, config: &'a EconConfig, clock: &'a Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Grant to every account whose last grant is at least the period
    /// ago. Idempotent at any cadence.
    pub fn run_cycle(&self) -> EconResult<BonusReport> {
        let now = self.clock.now();
        let mut grants_issued = 0;
        let mut coins_granted: Coins = 0;
        for account_id in self.store.account_ids()? {
            if let Some(granted) = self.grant_if_due(&account_id, now)? {
                grants_issued += 1;
                coins_granted += granted;
            }
        }
        log::debug!("bonus cycle: {grants_issued} grants, {coins_granted} coins");
        Ok(BonusReport {
            grants_issued,
            coins_granted,
        })
    }

    fn grant_if_due(&self, account_id: &str, now: UnixTime) -> EconResult<Option<Coins>> {
        let txn = self.store.begin()?;
        // Eligibility decided inside the write lock — a concurrent
        // cycle that already granted moved this timestamp forward.
        let last = match txn.last_bonus_at(account_id)? {
            Some(last) => last,
            None => return Ok(None),
        };
        if now - last < self.config.bonus_period_secs {
            return Ok(None);
        }

        let mut amount = self.config.bonus_base;
        for kind in txn.active_privileges(account_id, now)? {
            amount += self.config.bonus_for(kind);
        }
        if amount > 0 {
            Ledger::transfer_in(
                &txn,
                &Party::System,
                &Party::account(account_id),
                amount,
                Category::Bonus,
                Some("periodic bonus"),
                now,
            )?;
        }
        txn.set_last_bonus_at(account_id, now)?;
        txn.commit()?;
        Ok(Some(amount))
    }
}
