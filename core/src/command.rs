//! Gateway-facing request and outcome shapes.
//!
//! RULE: the caller picks the operation with an explicit variant.
//! No behavior is ever inferred from which optional fields happen to
//! be present. Outcomes are plain structured values — never platform
//! message objects.

use crate::{
    arrest::ArrestOutcome,
    games::{DiceBet, DiceOutcome, RouletteBet, RouletteOutcome},
    ledger::TransferOutcome,
    privilege::{PrivilegeKind, PurchaseOutcome},
    relationship::RelationshipReply,
    theft::TheftOutcome,
    types::{AccountId, Coins, UnixTime},
};
use serde::{Deserialize, Serialize};

/// One decoded command from the Messaging Gateway. The actor id
/// arrives alongside, not inside, the command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum EconCommand {
    Balance,
    Transfer {
        to: AccountId,
        amount: Coins,
        memo: Option<String>,
    },
    Roulette {
        #[serde(flatten)]
        bet: RouletteBet,
        stake: Coins,
    },
    Dice {
        #[serde(flatten)]
        bet: DiceBet,
        stake: Coins,
    },
    Steal {
        victim: AccountId,
    },
    /// `duration` is the free-form argument string; the arrest engine
    /// parses compound units out of it.
    Arrest {
        target: AccountId,
        duration: String,
    },
    Buy {
        kind: PrivilegeKind,
    },
    Propose {
        target: AccountId,
    },
    RespondProposal {
        initiator: AccountId,
        accept: bool,
    },
    RequestDivorce,
    RespondDivorce {
        initiator: AccountId,
        accept: bool,
    },
}

/// Structured result of a dispatched command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EconOutcome {
    Balance {
        account: AccountId,
        balance: Coins,
        best_win: Coins,
        worst_loss: Coins,
    },
    Transferred(TransferOutcome),
    RouletteRound(RouletteOutcome),
    DiceRound(DiceOutcome),
    Stolen(TheftOutcome),
    Arrested(ArrestOutcome),
    Purchased(PurchaseOutcome),
    ProposalSent {
        target: AccountId,
        expires_at: UnixTime,
    },
    Relationship(RelationshipReply),
    DivorceRequested {
        partner: AccountId,
        expires_at: UnixTime,
    },
}
