//! Relationship and handshake-request row queries.

use super::{EconStore, StoreTxn};
use crate::{
    error::EconResult,
    relationship::{RelationshipRow, RequestKind, RequestRow},
    types::UnixTime,
};
use rusqlite::{params, Connection, OptionalExtension};

impl EconStore {
    pub fn relationship_of(&self, account_id: &str) -> EconResult<Option<RelationshipRow>> {
        Ok(query_relationship_of(&self.conn, account_id)?)
    }

    pub fn sweep_expired_requests(&self, now: UnixTime) -> EconResult<usize> {
        let swept = self.conn.execute(
            "DELETE FROM relationship_request WHERE expires_at <= ?1",
            params![now],
        )?;
        Ok(swept)
    }
}

impl StoreTxn<'_> {
    pub fn relationship_of(&self, account_id: &str) -> EconResult<Option<RelationshipRow>> {
        Ok(query_relationship_of(&self.txn, account_id)?)
    }

    pub fn insert_relationship(
        &self,
        partner_a: &str,
        partner_b: &str,
        formed_at: UnixTime,
    ) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO relationship (partner_a, partner_b, formed_at) VALUES (?1, ?2, ?3)",
            params![partner_a, partner_b, formed_at],
        )?;
        Ok(())
    }

    pub fn delete_relationship(&self, partner_a: &str, partner_b: &str) -> EconResult<()> {
        self.txn.execute(
            "DELETE FROM relationship WHERE partner_a = ?1 AND partner_b = ?2",
            params![partner_a, partner_b],
        )?;
        Ok(())
    }

    pub fn request(
        &self,
        initiator: &str,
        responder: &str,
        kind: RequestKind,
    ) -> EconResult<Option<RequestRow>> {
        Ok(self
            .txn
            .query_row(
                "SELECT initiator, responder, kind, created_at, expires_at
                 FROM relationship_request
                 WHERE initiator = ?1 AND responder = ?2 AND kind = ?3",
                params![initiator, responder, kind.as_str()],
                request_mapper,
            )
            .optional()?)
    }

    /// Write the single request row for (initiator, responder, kind);
    /// an expired leftover is replaced.
    pub fn put_request(&self, row: &RequestRow) -> EconResult<()> {
        self.txn.execute(
            "INSERT INTO relationship_request (initiator, responder, kind, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (initiator, responder, kind) DO UPDATE SET
                 created_at = excluded.created_at,
                 expires_at = excluded.expires_at",
            params![
                row.initiator,
                row.responder,
                row.kind.as_str(),
                row.created_at,
                row.expires_at,
            ],
        )?;
        Ok(())
    }

    pub fn delete_request(
        &self,
        initiator: &str,
        responder: &str,
        kind: RequestKind,
    ) -> EconResult<()> {
        self.txn.execute(
            "DELETE FROM relationship_request
             WHERE initiator = ?1 AND responder = ?2 AND kind = ?3",
            params![initiator, responder, kind.as_str()],
        )?;
        Ok(())
    }
}

fn request_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<RequestRow> {
    let raw: String = row.get(2)?;
    let kind = RequestKind::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown request kind: {raw}").into(),
        )
    })?;
    Ok(RequestRow {
        initiator: row.get(0)?,
        responder: row.get(1)?,
        kind,
        created_at: row.get(3)?,
        expires_at: row.get(4)?,
    })
}

fn query_relationship_of(
    conn: &Connection,
    account_id: &str,
) -> rusqlite::Result<Option<RelationshipRow>> {
    conn.query_row(
        "SELECT partner_a, partner_b, formed_at
         FROM relationship WHERE partner_a = ?1 OR partner_b = ?1",
        params![account_id],
        |row| {
            Ok(RelationshipRow {
                partner_a: row.get(0)?,
                partner_b: row.get(1)?,
                formed_at: row.get(2)?,
            })
        },
    )
    .optional()
}
