//! Arrest row queries. A row past its release time is logically
//! absent: every read filters on release_at.

use super::{EconStore, StoreTxn};
use crate::{arrest::ArrestRow, error::EconResult, types::UnixTime};
use rusqlite::{params, Connection, OptionalExtension};

impl EconStore {
    pub fn active_arrest(&self, account_id: &str, now: UnixTime) -> EconResult<Option<ArrestRow>> {
        Ok(query_active_arrest(&self.conn, account_id, now)?)
    }

    /// Drop released rows. Hygiene only.
    pub fn sweep_released_arrests(&self, now: UnixTime) -> EconResult<usize> {
        let swept = self
            .conn
            .execute("DELETE FROM arrest WHERE release_at <= ?1", params![now])?;
        Ok(swept)
    }
}

impl StoreTxn<'_> {
    pub fn active_arrest(&self, account_id: &str, now: UnixTime) -> EconResult<Option<ArrestRow>> {
        Ok(query_active_arrest(&self.txn, account_id, now)?)
    }

    /// Remove whatever row occupies the slot, released or not.
    pub fn clear_arrest(&self, account_id: &str) -> EconResult<()> {
        self.txn.execute(
            "DELETE FROM arrest WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(())
    }

    pub fn insert_arrest(&self, row: &ArrestRow) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO arrest (account_id, officer_id, arrested_at, release_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![row.account_id, row.officer_id, row.arrested_at, row.release_at],
        )?;
        Ok(())
    }
}

fn query_active_arrest(
    conn: &Connection,
    account_id: &str,
    now: UnixTime,
) -> rusqlite::Result<Option<ArrestRow>> {
    conn.query_row(
        "SELECT account_id, officer_id, arrested_at, release_at
         FROM arrest WHERE account_id = ?1 AND release_at > ?2",
        params![account_id, now],
        |row| {
            Ok(ArrestRow {
                account_id: row.get(0)?,
                officer_id: row.get(1)?,
                arrested_at: row.get(2)?,
                release_at: row.get(3)?,
            })
        },
    )
    .optional()
}
