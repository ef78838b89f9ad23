//! Adversarial transfer — the thief/victim flow.
//!
//! Preconditions run in a fixed order so every refusal has exactly
//! one cause. The dispatch-level reads are authorization hints; the
//! transaction re-validates privilege, arrest state, and quota under
//! the write lock before anything moves. The movement and the daily
//! counter bump commit together — a failure partway leaves neither
//! applied.

use crate::{
    clock::Clock,
    config::EconConfig,
    error::{EconError, EconResult},
    ledger::{Category, Ledger, Party},
    privilege::PrivilegeKind,
    store::EconStore,
    types::Coins,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TheftOutcome {
    pub victim: String,
    pub amount: Coins,
    pub quota_used: u32,
    pub quota_limit: u32,
}

pub struct Theft<'a> {
    store: &'a EconStore,
    config: &'a EconConfig,
    clock: &'a Clock,
}

impl<'a> Theft<'a> {
    pub fn new(store: &'a EconStore, config: &'a EconConfig, clock: &'a Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn attempt(&self, thief: &str, victim: &str) -> EconResult<TheftOutcome> {
        let now = self.clock.now();

        if !self
            .store
            .has_active_privilege(thief, PrivilegeKind::Thief, now)?
        {
            return Err(EconError::denied("thief privilege required"));
        }
        if thief == victim {
            return Err(EconError::denied("cannot rob yourself"));
        }
        if self
            .store
            .has_active_privilege(victim, PrivilegeKind::Police, now)?
        {
            return Err(EconError::denied("victim is under police protection"));
        }
        if self.store.active_arrest(thief, now)?.is_some() {
            return Err(EconError::denied("you are under arrest"));
        }

        let txn = self.store.begin()?;

        let victim_row = txn
            .account(victim)?
            .ok_or_else(|| EconError::missing(format!("account {victim}")))?;

        // Re-validate under the write lock: the reads above were
        // outside the transaction and may be stale.
        if !txn.has_active_privilege(thief, PrivilegeKind::Thief, now)? {
            return Err(EconError::denied("thief privilege required"));
        }
        if txn.active_arrest(thief, now)?.is_some() {
            return Err(EconError::denied("you are under arrest"));
        }

        let (mut count, mut reset_at) = txn
            .theft_counter(thief)?
            .ok_or_else(|| EconError::missing(format!("account {thief}")))?;
        // Rolling day: reset on elapsed time, not a calendar boundary.
        if now - reset_at >= self.config.daily_window_secs {
            count = 0;
            reset_at = now;
        }
        if count >= self.config.theft_daily_quota {
            return Err(EconError::QuotaExceeded {
                used: count,
                limit: self.config.theft_daily_quota,
            });
        }

        let spoils = victim_row.balance * Coins::from(self.config.theft_rate_percent) / 100;
        if spoils <= 0 {
            // Nothing to take: no quota consumed, no state mutated.
            return Err(EconError::NoEffect);
        }

        Ledger::transfer_in(
            &txn,
            &Party::account(victim),
            &Party::account(thief),
            spoils,
            Category::Theft,
            Some("stolen"),
            now,
        )?;
        txn.set_theft_counter(thief, count + 1, reset_at)?;
        txn.commit()?;

        log::debug!("theft {thief} -> {victim}: {spoils} coins ({}/{})", count + 1, self.config.theft_daily_quota);
        Ok(TheftOutcome {
            victim: victim.to_string(),
            amount: spoils,
            quota_used: count + 1,
            quota_limit: self.config.theft_daily_quota,
        })
    }
}
