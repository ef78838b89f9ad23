//! Marriage records and the two-party handshake.
//!
//! Creation and termination both go through a durable pending-request
//! row keyed by the (initiator, responder) pair with an explicit
//! expiry. No in-process correlation state: any process instance can
//! answer any pending request, and a restart loses nothing.

use crate::{
    clock::Clock,
    config::EconConfig,
    error::{EconError, EconResult},
    store::EconStore,
    types::{AccountId, UnixTime},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Marriage,
    Divorce,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marriage => "marriage",
            Self::Divorce => "divorce",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "marriage" => Some(Self::Marriage),
            "divorce" => Some(Self::Divorce),
            _ => None,
        }
    }
}

/// An active relationship. Partners are stored normalized:
/// partner_a < partner_b.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipRow {
    pub partner_a: AccountId,
    pub partner_b: AccountId,
    pub formed_at: UnixTime,
}

impl RelationshipRow {
    pub fn partner_of(&self, account_id: &str) -> &str {
        if self.partner_a == account_id {
            &self.partner_b
        } else {
            &self.partner_a
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestRow {
    pub initiator: AccountId,
    pub responder: AccountId,
    pub kind: RequestKind,
    pub created_at: UnixTime,
    pub expires_at: UnixTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RelationshipReply {
    Married { partner: AccountId, since: UnixTime },
    Divorced { partner: AccountId },
    Declined,
}

/// Normalized unordered pair: lesser id first.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

pub struct Relationships<'a> {
    store: &'a EconStore,
    config: &'a EconConfig,
    clock: &'a Clock,
}

impl<'a> Relationships<'a> {
    pub fn new(store: &'a EconStore, config: &'a EconConfig, clock: &'a Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn partner_of(&self, account_id: &str) -> EconResult<Option<AccountId>> {
        Ok(self
            .store
            .relationship_of(account_id)?
            .map(|rel| rel.partner_of(account_id).to_string()))
    }

    pub fn propose(&self, actor: &str, target: &str) -> EconResult<RequestRow> {
        if actor == target {
            return Err(EconError::denied("cannot marry yourself"));
        }
        let now = self.clock.now();
        let txn = self.store.begin()?;
        if txn.account(target)?.is_none() {
            return Err(EconError::missing(format!("account {target}")));
        }
        if txn.relationship_of(actor)?.is_some() {
            return Err(EconError::already("you are already married"));
        }
        if txn.relationship_of(target)?.is_some() {
            return Err(EconError::already("target is already married"));
        }
        if let Some(pending) = txn.request(actor, target, RequestKind::Marriage)? {
            if pending.expires_at > now {
                return Err(EconError::already("proposal already pending"));
            }
        }
        let row = RequestRow {
            initiator: actor.to_string(),
            responder: target.to_string(),
            kind: RequestKind::Marriage,
            created_at: now,
            expires_at: now + self.config.request_ttl_secs,
        };
        txn.put_request(&row)?;
        txn.commit()?;
        Ok(row)
    }

    /// Answer a pending request. Only the named responder can answer;
    /// the invariants are re-checked at accept time, not at propose
    /// time.
    pub fn respond(
        &self,
        responder: &str,
        initiator: &str,
        kind: RequestKind,
        accept: bool,
    ) -> EconResult<RelationshipReply> {
        let now = self.clock.now();
        let txn = self.store.begin()?;
        let pending = txn
            .request(initiator, responder, kind)?
            .filter(|req| req.expires_at > now)
            .ok_or_else(|| EconError::missing(format!("pending {} request", kind.as_str())))?;
        txn.delete_request(&pending.initiator, &pending.responder, kind)?;

        if !accept {
            txn.commit()?;
            return Ok(RelationshipReply::Declined);
        }

        match kind {
            RequestKind::Marriage => {
                if txn.relationship_of(initiator)?.is_some() {
                    return Err(EconError::already("initiator is already married"));
                }
                if txn.relationship_of(responder)?.is_some() {
                    return Err(EconError::already("you are already married"));
                }
                let (a, b) = pair_key(initiator, responder);
                txn.insert_relationship(&a, &b, now)?;
                txn.commit()?;
                Ok(RelationshipReply::Married {
                    partner: initiator.to_string(),
                    since: now,
                })
            }
            RequestKind::Divorce => {
                let rel = txn
                    .relationship_of(responder)?
                    .filter(|rel| rel.partner_of(responder) == initiator)
                    .ok_or_else(|| EconError::missing("marriage to dissolve"))?;
                txn.delete_relationship(&rel.partner_a, &rel.partner_b)?;
                txn.commit()?;
                Ok(RelationshipReply::Divorced {
                    partner: initiator.to_string(),
                })
            }
        }
    }

    /// Open the termination handshake; the partner must accept.
    pub fn request_divorce(&self, actor: &str) -> EconResult<RequestRow> {
        let now = self.clock.now();
        let txn = self.store.begin()?;
        let rel = txn
            .relationship_of(actor)?
            .ok_or_else(|| EconError::missing("marriage"))?;
        let partner = rel.partner_of(actor).to_string();
        if let Some(pending) = txn.request(actor, &partner, RequestKind::Divorce)? {
            if pending.expires_at > now {
                return Err(EconError::already("divorce request already pending"));
            }
        }
        let row = RequestRow {
            initiator: actor.to_string(),
            responder: partner,
            kind: RequestKind::Divorce,
            created_at: now,
            expires_at: now + self.config.request_ttl_secs,
        };
        txn.put_request(&row)?;
        txn.commit()?;
        Ok(row)
    }

    /// Drop expired handshake rows. Returns how many were swept.
    pub fn sweep_expired_requests(&self) -> EconResult<usize> {
        self.store.sweep_expired_requests(self.clock.now())
    }
}
