//! Time-limited entitlements ("thief", "police", "vip").
//!
//! RULE: `has_active` is the authoritative check used by the theft,
//! arrest, and bonus engines. A row whose expiry has passed is
//! inactive the instant it expires — the periodic sweep is storage
//! hygiene, never correctness.

use crate::{
    clock::Clock,
    config::EconConfig,
    error::{EconError, EconResult},
    ledger::{Category, Ledger, Party},
    store::EconStore,
    types::{AccountId, Coins, UnixTime},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeKind {
    Thief,
    Police,
    Vip,
}

impl PrivilegeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thief => "thief",
            Self::Police => "police",
            Self::Vip => "vip",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "thief" => Some(Self::Thief),
            "police" => Some(Self::Police),
            "vip" => Some(Self::Vip),
            _ => None,
        }
    }
}

/// One privilege row, active or stale.
#[derive(Debug, Clone, Serialize)]
pub struct PrivilegeRow {
    pub account_id: AccountId,
    pub kind: PrivilegeKind,
    pub granted_at: UnixTime,
    /// None = permanent.
    pub expires_at: Option<UnixTime>,
}

impl PrivilegeRow {
    pub fn is_active(&self, now: UnixTime) -> bool {
        self.expires_at.map_or(true, |t| t > now)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    pub kind: PrivilegeKind,
    pub price: Coins,
    pub expires_at: Option<UnixTime>,
}

pub struct PrivilegeStore<'a> {
    store: &'a EconStore,
    clock: &'a Clock,
}

impl<'a> PrivilegeStore<'a> {
    pub fn new(store: &'a EconStore, clock: &'a Clock) -> Self {
        Self { store, clock }
    }

    /// Grant a privilege. Granting over a still-active row rejects;
    /// an expired leftover is replaced in place, so the (account,
    /// kind) uniqueness invariant can never produce two active rows.
    pub fn grant(
        &self,
        account_id: &str,
        kind: PrivilegeKind,
        duration_secs: Option<i64>,
    ) -> EconResult<PrivilegeRow> {
        let now = self.clock.now();
        let txn = self.store.begin()?;
        txn.ensure_account(account_id, now)?;
        if let Some(row) = txn.privilege(account_id, kind)? {
            if row.is_active(now) {
                return Err(EconError::already(format!(
                    "{} privilege already active",
                    kind.as_str()
                )));
            }
        }
        let expires_at = duration_secs.map(|d| now + d);
        txn.upsert_privilege(account_id, kind, now, expires_at)?;
        txn.commit()?;
        Ok(PrivilegeRow {
            account_id: account_id.to_string(),
            kind,
            granted_at: now,
            expires_at,
        })
    }

    /// The authoritative permission check — expiry is examined at
    /// read time, swept or not.
    pub fn has_active(&self, account_id: &str, kind: PrivilegeKind) -> EconResult<bool> {
        self.store
            .has_active_privilege(account_id, kind, self.clock.now())
    }

    /// Buy a privilege from the shop catalog: debit and grant commit
    /// together.
    pub fn purchase(
        &self,
        config: &EconConfig,
        actor: &str,
        kind: PrivilegeKind,
    ) -> EconResult<PurchaseOutcome> {
        let offer = config
            .shop_offer(kind)
            .ok_or_else(|| EconError::missing(format!("shop offer for {}", kind.as_str())))?;
        let now = self.clock.now();
        let txn = self.store.begin()?;
        txn.ensure_account(actor, now)?;
        if let Some(row) = txn.privilege(actor, kind)? {
            if row.is_active(now) {
                return Err(EconError::already(format!(
                    "{} privilege already active",
                    kind.as_str()
                )));
            }
        }
        Ledger::transfer_in(
            &txn,
            &Party::account(actor),
            &Party::System,
            offer.price,
            Category::Purchase,
            Some(kind.as_str()),
            now,
        )?;
        let expires_at = offer.duration_secs.map(|d| now + d);
        txn.upsert_privilege(actor, kind, now, expires_at)?;
        txn.commit()?;
        Ok(PurchaseOutcome {
            kind,
            price: offer.price,
            expires_at,
        })
    }

    /// Drop expired rows. Returns how many were swept.
    pub fn sweep_expired(&self) -> EconResult<usize> {
        self.store.sweep_expired_privileges(self.clock.now())
    }
}
