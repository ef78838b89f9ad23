//! The ledger — sole owner of balance mutation.
//!
//! RULE: every coin movement goes through `transfer`/`transfer_in`.
//! One movement = one balance pair update + one append-only entry,
//! committed together or not at all. The balance check happens inside
//! the IMMEDIATE transaction, so a concurrent debit can never
//! invalidate it between check and commit.

use crate::{
    clock::Clock,
    config::EconConfig,
    cooldown::ACTION_TRANSFER,
    error::{EconError, EconResult},
    store::{EconStore, LedgerEntryRow, StoreTxn},
    types::{AccountId, Coins, UnixTime},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One side of a movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    /// The house. Mints on credit, absorbs on debit.
    System,
    Account(AccountId),
}

impl Party {
    pub fn account(id: &str) -> Self {
        Party::Account(id.to_string())
    }

    fn id(&self) -> Option<&str> {
        match self {
            Party::System => None,
            Party::Account(id) => Some(id),
        }
    }
}

/// Movement category tag, recorded on every ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transfer,
    Roulette,
    Dice,
    Theft,
    Bonus,
    Purchase,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Roulette => "roulette",
            Self::Dice => "dice",
            Self::Theft => "theft",
            Self::Bonus => "bonus",
            Self::Purchase => "purchase",
        }
    }

    /// Gambling movements update the lifetime win/loss extrema.
    pub fn is_gambling(&self) -> bool {
        matches!(self, Self::Roulette | Self::Dice)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub entry_id: String,
    pub amount: Coins,
    pub window_used: u32,
    pub window_limit: u32,
}

pub struct Ledger<'a> {
    store: &'a EconStore,
    clock: &'a Clock,
}

impl<'a> Ledger<'a> {
    pub fn new(store: &'a EconStore, clock: &'a Clock) -> Self {
        Self { store, clock }
    }

    /// Move `amount` coins from `from` to `to` as one atomic unit.
    pub fn transfer(
        &self,
        from: &Party,
        to: &Party,
        amount: Coins,
        category: Category,
        memo: Option<&str>,
    ) -> EconResult<LedgerEntryRow> {
        let now = self.clock.now();
        let txn = self.store.begin()?;
        let entry = Self::transfer_in(&txn, from, to, amount, category, memo, now)?;
        txn.commit()?;
        Ok(entry)
    }

    /// The movement itself, composed into a caller-owned transaction.
    /// Theft, bonuses, and purchases use this to bundle the movement
    /// with their own state changes in a single commit.
    pub fn transfer_in(
        txn: &StoreTxn<'_>,
        from: &Party,
        to: &Party,
        amount: Coins,
        category: Category,
        memo: Option<&str>,
        now: UnixTime,
    ) -> EconResult<LedgerEntryRow> {
        if amount <= 0 {
            return Err(EconError::InvalidAmount);
        }
        if let Party::Account(id) = from {
            txn.ensure_account(id, now)?;
            let have = txn.balance(id)?.unwrap_or(0);
            if have < amount {
                return Err(EconError::InsufficientFunds { have, need: amount });
            }
            txn.set_balance(id, have - amount)?;
            if category.is_gambling() {
                txn.lower_worst_loss(id, -amount)?;
            }
        }
        if let Party::Account(id) = to {
            txn.ensure_account(id, now)?;
            let have = txn.balance(id)?.unwrap_or(0);
            txn.set_balance(id, have + amount)?;
            if category.is_gambling() {
                txn.raise_best_win(id, amount)?;
            }
        }
        let entry = LedgerEntryRow {
            entry_id: Uuid::new_v4().to_string(),
            source: from.id().map(str::to_string),
            dest: to.id().map(str::to_string),
            amount,
            category: category.as_str().to_string(),
            memo: memo.map(str::to_string),
            created_at: now,
        };
        txn.append_ledger_entry(&entry)?;
        Ok(entry)
    }

    /// User-to-user transfer command. The sliding-window quota is
    /// re-counted, the window timestamp appended, and the movement
    /// applied in one unit.
    pub fn user_transfer(
        &self,
        config: &EconConfig,
        from: &str,
        to: &str,
        amount: Coins,
        memo: Option<&str>,
    ) -> EconResult<TransferOutcome> {
        if from == to {
            return Err(EconError::denied("cannot transfer to yourself"));
        }
        let now = self.clock.now();
        let txn = self.store.begin()?;
        txn.ensure_account(from, now)?;
        if txn.account(to)?.is_none() {
            return Err(EconError::missing(format!("account {to}")));
        }
        let since = now - config.transfer_window_secs;
        let used = txn.window_count(from, ACTION_TRANSFER, since)?;
        if used >= config.transfer_window_quota {
            return Err(EconError::QuotaExceeded {
                used,
                limit: config.transfer_window_quota,
            });
        }
        let entry = Self::transfer_in(
            &txn,
            &Party::account(from),
            &Party::account(to),
            amount,
            Category::Transfer,
            memo,
            now,
        )?;
        txn.push_window(from, ACTION_TRANSFER, now)?;
        txn.commit()?;
        Ok(TransferOutcome {
            entry_id: entry.entry_id,
            amount,
            window_used: used + 1,
            window_limit: config.transfer_window_quota,
        })
    }
}
