//! Cooldown and sliding-window row queries.

use super::{EconStore, StoreTxn};
use crate::{error::EconResult, types::UnixTime};
use rusqlite::{params, OptionalExtension};

impl EconStore {
    /// Retention: drop window rows that have aged out of every
    /// possible quota decision.
    pub fn prune_window(&self, action: &str, before: UnixTime) -> EconResult<usize> {
        let pruned = self.conn.execute(
            "DELETE FROM action_window WHERE action = ?1 AND acted_at < ?2",
            params![action, before],
        )?;
        Ok(pruned)
    }
}

impl StoreTxn<'_> {
    pub fn last_action_at(&self, account_id: &str, action: &str) -> EconResult<Option<UnixTime>> {
        Ok(self
            .txn
            .query_row(
                "SELECT last_at FROM cooldown WHERE account_id = ?1 AND action = ?2",
                params![account_id, action],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn touch_action(&self, account_id: &str, action: &str, at: UnixTime) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO cooldown (account_id, action, last_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (account_id, action) DO UPDATE SET last_at = excluded.last_at",
            params![account_id, action, at],
        )?;
        Ok(())
    }

    /// Actions inside the trailing window (acted_at > since).
    pub fn window_count(&self, account_id: &str, action: &str, since: UnixTime) -> EconResult<u32> {
        let count: i64 = self.txn.query_row(
            "SELECT COUNT(*) FROM action_window
             WHERE account_id = ?1 AND action = ?2 AND acted_at > ?3",
            params![account_id, action, since],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    pub fn push_window(&self, account_id: &str, action: &str, at: UnixTime) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO action_window (account_id, action, acted_at) VALUES (?1, ?2, ?3)",
            params![account_id, action, at],
        )?;
        Ok(())
    }
}
