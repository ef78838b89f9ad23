//! Privilege row queries.

use super::{EconStore, StoreTxn};
use crate::{
    error::EconResult,
    privilege::{PrivilegeKind, PrivilegeRow},
    types::UnixTime,
};
use rusqlite::{params, Connection, OptionalExtension};

impl EconStore {
    /// The authoritative permission check: expiry is compared against
    /// `now` in the query itself, swept or not.
    pub fn has_active_privilege(
        &self,
        account_id: &str,
        kind: PrivilegeKind,
        now: UnixTime,
    ) -> EconResult<bool> {
        Ok(query_has_active(&self.conn, account_id, kind, now)?)
    }

    /// Drop rows whose expiry has passed. Storage hygiene only — reads
    /// never trust an expired row.
    pub fn sweep_expired_privileges(&self, now: UnixTime) -> EconResult<usize> {
        let swept = self.conn.execute(
            "DELETE FROM privilege WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![now],
        )?;
        Ok(swept)
    }
}

impl StoreTxn<'_> {
    pub fn privilege(
        &self,
        account_id: &str,
        kind: PrivilegeKind,
    ) -> EconResult<Option<PrivilegeRow>> {
        Ok(query_privilege(&self.txn, account_id, kind)?)
    }

    pub fn has_active_privilege(
        &self,
        account_id: &str,
        kind: PrivilegeKind,
        now: UnixTime,
    ) -> EconResult<bool> {
        Ok(query_has_active(&self.txn, account_id, kind, now)?)
    }

    /// Kinds currently active for an account (expiry checked in-query).
    pub fn active_privileges(
        &self,
        account_id: &str,
        now: UnixTime,
    ) -> EconResult<Vec<PrivilegeKind>> {
        let mut stmt = self.txn.prepare(
            "SELECT kind FROM privilege
             WHERE account_id = ?1 AND (expires_at IS NULL OR expires_at > ?2)
             ORDER BY kind",
        )?;
        let kinds = stmt
            .query_map(params![account_id, now], |row| {
                kind_from_text(row.get::<_, String>(0)?)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(kinds)
    }

    /// Write the single row for (account, kind). The primary key keeps
    /// the one-active-row invariant; callers decide whether an active
    /// row may be replaced.
    pub fn upsert_privilege(
        &self,
        account_id: &str,
        kind: PrivilegeKind,
        granted_at: UnixTime,
        expires_at: Option<UnixTime>,
    ) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO privilege (account_id, kind, granted_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (account_id, kind) DO UPDATE SET
                 granted_at = excluded.granted_at,
                 expires_at = excluded.expires_at",
            params![account_id, kind.as_str(), granted_at, expires_at],
        )?;
        Ok(())
    }
}

fn kind_from_text(raw: String) -> rusqlite::Result<PrivilegeKind> {
    PrivilegeKind::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown privilege kind: {raw}").into(),
        )
    })
}

fn query_privilege(
    conn: &Connection,
    account_id: &str,
    kind: PrivilegeKind,
) -> rusqlite::Result<Option<PrivilegeRow>> {
    conn.query_row(
        "SELECT account_id, kind, granted_at, expires_at
         FROM privilege WHERE account_id = ?1 AND kind = ?2",
        params![account_id, kind.as_str()],
        |row| {
            Ok(PrivilegeRow {
                account_id: row.get(0)?,
                kind: kind_from_text(row.get::<_, String>(1)?)?,
                granted_at: row.get(2)?,
                expires_at: row.get(3)?,
            })
        },
    )
    .optional()
}

fn query_has_active(
    conn: &Connection,
    account_id: &str,
    kind: PrivilegeKind,
    now: UnixTime,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM privilege
         WHERE account_id = ?1 AND kind = ?2
           AND (expires_at IS NULL OR expires_at > ?3)",
        params![account_id, kind.as_str(), now],
        |row| row.get(0),
    )
}
