//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Engines call typed store methods — they never execute SQL directly.
//!
//! Every mutating sequence runs inside a StoreTxn: one IMMEDIATE
//! SQLite transaction. IMMEDIATE takes the write lock at begin time,
//! so an invariant checked inside the transaction (balance, quota,
//! arrest state) still holds at commit — check and act cannot be
//! split by a concurrent writer.

mod arrest;
mod cooldown;
mod privilege;
mod relationship;

use crate::{
    error::EconResult,
    types::{AccountId, Coins, UnixTime},
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

pub struct EconStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl EconStore {
    pub fn open(path: &str) -> EconResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EconResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new isolated database.
    pub fn reopen(&self) -> EconResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EconResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_privileges.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_cooldowns.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_arrests.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/005_relationships.sql"))?;
        Ok(())
    }

    /// Begin one atomic unit. The write lock is taken up front.
    pub fn begin(&self) -> EconResult<StoreTxn<'_>> {
        let txn =
            rusqlite::Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Ok(StoreTxn { txn })
    }

    // ── Account reads ──────────────────────────────────────────

    pub fn account(&self, account_id: &str) -> EconResult<Option<AccountRow>> {
        Ok(read_account(&self.conn, account_id)?)
    }

    pub fn balance_of(&self, account_id: &str) -> EconResult<Option<Coins>> {
        Ok(read_balance(&self.conn, account_id)?)
    }

    pub fn account_ids(&self) -> EconResult<Vec<AccountId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT account_id FROM account ORDER BY account_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // ── Ledger reads ───────────────────────────────────────────

    /// Most recent entries touching an account, newest first.
    pub fn ledger_entries_for(
        &self,
        account_id: &str,
        limit: usize,
    ) -> EconResult<Vec<LedgerEntryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_id, source, dest, amount, category, memo, created_at
             FROM ledger_entry
             WHERE source = ?1 OR dest = ?1
             ORDER BY created_at DESC, entry_id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![account_id, limit as i64], ledger_entry_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn ledger_entry_count(&self) -> EconResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM ledger_entry", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ── Test / summary helpers ─────────────────────────────────

    pub fn sum_of_balances(&self) -> EconResult<Coins> {
        let mut stmt = self.conn.prepare("SELECT balance FROM account")?;
        let balances = stmt
            .query_map([], |row| coins_from_text(row.get::<_, String>(0)?))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(balances.into_iter().sum())
    }

    pub fn account_count(&self) -> EconResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM account", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Net coins issued by the system side of the ledger: system
    /// credits minus system absorbs. Equals the sum of all balances
    /// when conservation holds.
    pub fn system_net_issued(&self) -> EconResult<Coins> {
        let mut stmt = self
            .conn
            .prepare("SELECT source IS NULL, dest IS NULL, amount FROM ledger_entry")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, bool>(0)?,
                    row.get::<_, bool>(1)?,
                    coins_from_text(row.get::<_, String>(2)?)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut net: Coins = 0;
        for (from_system, to_system, amount) in rows {
            if from_system && !to_system {
                net += amount;
            } else if to_system && !from_system {
                net -= amount;
            }
        }
        Ok(net)
    }
}

/// One open IMMEDIATE transaction. Dropping without commit rolls
/// everything back, so early `return Err(..)` leaves zero effect.
pub struct StoreTxn<'c> {
    txn: rusqlite::Transaction<'c>,
}

impl StoreTxn<'_> {
    pub fn commit(self) -> EconResult<()> {
        self.txn.commit().map_err(Into::into)
    }

    // ── Accounts ───────────────────────────────────────────────

    /// Lazily create an account on first interaction.
    pub fn ensure_account(&self, account_id: &str, now: UnixTime) -> EconResult<()> {
        self.txn.execute(
            "INSERT OR IGNORE INTO account (account_id, created_at) VALUES (?1, ?2)",
            params![account_id, now],
        )?;
        Ok(())
    }

    pub fn account(&self, account_id: &str) -> EconResult<Option<AccountRow>> {
        Ok(read_account(&self.txn, account_id)?)
    }

    pub fn balance(&self, account_id: &str) -> EconResult<Option<Coins>> {
        Ok(read_balance(&self.txn, account_id)?)
    }

    pub fn set_balance(&self, account_id: &str, balance: Coins) -> EconResult<()> {
        self.txn.execute(
            "UPDATE account SET balance = ?1 WHERE account_id = ?2",
            params![balance.to_string(), account_id],
        )?;
        Ok(())
    }

    /// Record a new single-round best win if `candidate` beats it.
    pub fn raise_best_win(&self, account_id: &str, candidate: Coins) -> EconResult<()> {
        let current: Coins = self
            .txn
            .query_row(
                "SELECT best_win FROM account WHERE account_id = ?1",
                params![account_id],
                |row| coins_from_text(row.get::<_, String>(0)?),
            )
            .optional()?
            .unwrap_or(0);
        if candidate > current {
            self.txn.execute(
                "UPDATE account SET best_win = ?1 WHERE account_id = ?2",
                params![candidate.to_string(), account_id],
            )?;
        }
        Ok(())
    }

    /// Record a new single-round worst loss if `candidate` undercuts it.
    pub fn lower_worst_loss(&self, account_id: &str, candidate: Coins) -> EconResult<()> {
        let current: Coins = self
            .txn
            .query_row(
                "SELECT worst_loss FROM account WHERE account_id = ?1",
                params![account_id],
                |row| coins_from_text(row.get::<_, String>(0)?),
            )
            .optional()?
            .unwrap_or(0);
        if candidate < current {
            self.txn.execute(
                "UPDATE account SET worst_loss = ?1 WHERE account_id = ?2",
                params![candidate.to_string(), account_id],
            )?;
        }
        Ok(())
    }

    // ── Daily theft counter ────────────────────────────────────

    pub fn theft_counter(&self, account_id: &str) -> EconResult<Option<(u32, UnixTime)>> {
        Ok(self
            .txn
            .query_row(
                "SELECT theft_count, theft_reset_at FROM account WHERE account_id = ?1",
                params![account_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }

    pub fn set_theft_counter(
        &self,
        account_id: &str,
        count: u32,
        reset_at: UnixTime,
    ) -> EconResult<()> {
        self.txn.execute(
            "UPDATE account SET theft_count = ?1, theft_reset_at = ?2 WHERE account_id = ?3",
            params![count, reset_at, account_id],
        )?;
        Ok(())
    }

    // ── Bonus timestamp ────────────────────────────────────────

    pub fn last_bonus_at(&self, account_id: &str) -> EconResult<Option<UnixTime>> {
        Ok(self
            .txn
            .query_row(
                "SELECT last_bonus_at FROM account WHERE account_id = ?1",
                params![account_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_last_bonus_at(&self, account_id: &str, at: UnixTime) -> EconResult<()> {
        self.txn.execute(
            "UPDATE account SET last_bonus_at = ?1 WHERE account_id = ?2",
            params![at, account_id],
        )?;
        Ok(())
    }

    // ── Ledger ─────────────────────────────────────────────────

    /// Append one write-once movement record.
    pub fn append_ledger_entry(&self, entry: &LedgerEntryRow) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO ledger_entry (entry_id, source, dest, amount, category, memo, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.entry_id,
                entry.source,
                entry.dest,
                entry.amount.to_string(),
                entry.category,
                entry.memo,
                entry.created_at,
            ],
        )?;
        Ok(())
    }
}

// ── Row types ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AccountRow {
    pub account_id: AccountId,
    pub balance: Coins,
    pub best_win: Coins,
    pub worst_loss: Coins,
    pub theft_count: u32,
    pub theft_reset_at: UnixTime,
    pub last_bonus_at: UnixTime,
    pub created_at: UnixTime,
}

/// One immutable ledger entry. `None` source/dest = the system side;
/// `amount` is the unsigned magnitude.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LedgerEntryRow {
    pub entry_id: String,
    pub source: Option<AccountId>,
    pub dest: Option<AccountId>,
    pub amount: Coins,
    pub category: String,
    pub memo: Option<String>,
    pub created_at: UnixTime,
}

// ── Shared row readers ─────────────────────────────────────────

pub(crate) fn coins_from_text(raw: String) -> rusqlite::Result<Coins> {
    raw.parse::<Coins>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn read_account(conn: &Connection, account_id: &str) -> rusqlite::Result<Option<AccountRow>> {
    conn.query_row(
        "SELECT account_id, balance, best_win, worst_loss,
                theft_count, theft_reset_at, last_bonus_at, created_at
         FROM account WHERE account_id = ?1",
        params![account_id],
        |row| {
            Ok(AccountRow {
                account_id: row.get(0)?,
                balance: coins_from_text(row.get::<_, String>(1)?)?,
                best_win: coins_from_text(row.get::<_, String>(2)?)?,
                worst_loss: coins_from_text(row.get::<_, String>(3)?)?,
                theft_count: row.get(4)?,
                theft_reset_at: row.get(5)?,
                last_bonus_at: row.get(6)?,
                created_at: row.get(7)?,
            })
        },
    )
    .optional()
}

fn read_balance(conn: &Connection, account_id: &str) -> rusqlite::Result<Option<Coins>> {
    conn.query_row(
        "SELECT balance FROM account WHERE account_id = ?1",
        params![account_id],
        |row| coins_from_text(row.get::<_, String>(0)?),
    )
    .optional()
}

fn ledger_entry_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<LedgerEntryRow> {
    Ok(LedgerEntryRow {
        entry_id: row.get(0)?,
        source: row.get(1)?,
        dest: row.get(2)?,
        amount: coins_from_text(row.get::<_, String>(3)?)?,
        category: row.get(4)?,
        memo: row.get(5)?,
        created_at: row.get(6)?,
    })
}
