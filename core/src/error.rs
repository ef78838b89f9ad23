use crate::types::Coins;
use thiserror::Error;

/// The expected-outcome taxonomy. Every public operation either
/// commits all of its described effects or returns one of these with
/// zero effect — the caller is never left unsure whether a mutation
/// happened.
#[derive(Error, Debug)]
pub enum EconError {
    #[error("amount must be positive")]
    InvalidAmount,

    #[error("malformed bet: {detail}")]
    InvalidBet { detail: String },

    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Coins, need: Coins },

    #[error("permission denied: {detail}")]
    PermissionDenied { detail: String },

    #[error("already in that state: {detail}")]
    AlreadyInState { detail: String },

    #[error("quota exceeded: {used} of {limit} used")]
    QuotaExceeded { used: u32, limit: u32 },

    #[error("cooldown active: {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("operation had no effect")]
    NoEffect,

    // Infrastructure faults — the transaction has rolled back, retry
    // or surface a generic failure.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EconResult<T> = Result<T, EconError>;

impl EconError {
    pub(crate) fn denied(detail: impl Into<String>) -> Self {
        Self::PermissionDenied {
            detail: detail.into(),
        }
    }

    pub(crate) fn already(detail: impl Into<String>) -> Self {
        Self::AlreadyInState {
            detail: detail.into(),
        }
    }

    pub(crate) fn missing(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}
