//! Roulette and dice — payout resolution and round settlement.
//!
//! RULES:
//!   - Payout functions are pure in (bet, stake, drawn outcome); the
//!     draw is a parameter, so tests pin outcomes exactly.
//!   - The stake is debited to the house up front and forfeited on a
//!     miss; a win credits stake × multiplier back in the same round.
//!   - Parallel bets each stake independently — one bet's loss never
//!     offsets another bet's stake requirement.

use crate::{
    clock::Clock,
    config::{DiceTable, EconConfig, RouletteTable},
    error::{EconError, EconResult},
    ledger::{Category, Ledger, Party},
    rng::TableRng,
    store::EconStore,
    types::Coins,
};
use serde::{Deserialize, Serialize};

/// Red pockets on a European wheel; 0 is neither color.
const RED_POCKETS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bet", rename_all = "snake_case")]
pub enum RouletteBet {
    /// One pocket, 0..=36.
    Straight { pocket: u8 },
    Color { color: Color },
    /// Zero loses parity bets.
    Parity { parity: Parity },
    /// Dozen 1..=3, covering twelve pockets each.
    Dozen { dozen: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bet", rename_all = "snake_case")]
pub enum DiceBet {
    /// One die, exact face 1..=6.
    Face { face: u8 },
    /// Two dice, target 1..=12. The sum pays the full tier; matching
    /// a single die (but not the sum) pays the partial tier.
    Target { target: u8 },
}

/// The drawn outcome of a dice round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DiceRoll {
    One(u8),
    Two(u8, u8),
}

pub fn pocket_color(pocket: u8) -> Option<Color> {
    if pocket == 0 || pocket > 36 {
        return None;
    }
    if RED_POCKETS.contains(&pocket) {
        Some(Color::Red)
    } else {
        Some(Color::Black)
    }
}

fn validate_roulette_bet(bet: &RouletteBet) -> EconResult<()> {
    let ok = match bet {
        RouletteBet::Straight { pocket } => *pocket <= 36,
        RouletteBet::Color { .. } | RouletteBet::Parity { .. } => true,
        RouletteBet::Dozen { dozen } => (1..=3).contains(dozen),
    };
    if ok {
        Ok(())
    } else {
        Err(EconError::InvalidBet {
            detail: format!("{bet:?}"),
        })
    }
}

fn validate_dice_bet(bet: &DiceBet) -> EconResult<()> {
    let ok = match bet {
        DiceBet::Face { face } => (1..=6).contains(face),
        DiceBet::Target { target } => (1..=12).contains(target),
    };
    if ok {
        Ok(())
    } else {
        Err(EconError::InvalidBet {
            detail: format!("{bet:?}"),
        })
    }
}

/// Total payout for a settled roulette round. Zero = stake lost.
pub fn roulette_payout(bet: &RouletteBet, stake: Coins, pocket: u8, table: &RouletteTable) -> Coins {
    let multiplier = match bet {
        RouletteBet::Straight { pocket: picked } => {
            if *picked == pocket {
                table.straight
            } else {
                0
            }
        }
        RouletteBet::Color { color } => {
            if pocket_color(pocket) == Some(*color) {
                table.color
            } else {
                0
            }
        }
        RouletteBet::Parity { parity } => match pocket_color(pocket) {
            None => 0,
            Some(_) => {
                let drawn = if pocket % 2 == 0 {
                    Parity::Even
                } else {
                    Parity::Odd
                };
                if drawn == *parity {
                    table.parity
                } else {
                    0
                }
            }
        },
        RouletteBet::Dozen { dozen } => {
            if pocket != 0 && (pocket - 1) / 12 + 1 == *dozen {
                table.dozen
            } else {
                0
            }
        }
    };
    stake * Coins::from(multiplier)
}

/// Total payout for a settled dice round.
pub fn dice_payout(bet: &DiceBet, stake: Coins, roll: DiceRoll, table: &DiceTable) -> Coins {
    let multiplier = match (bet, roll) {
        (DiceBet::Face { face }, DiceRoll::One(die)) => {
            if *face == die {
                table.exact_face
            } else {
                0
            }
        }
        (DiceBet::Target { target }, DiceRoll::Two(d1, d2)) => {
            if *target == d1 + d2 {
                table.exact_sum
            } else if *target == d1 || *target == d2 {
                table.partial
            } else {
                0
            }
        }
        // A roll drawn for the other game shape settles as a miss;
        // play_dice never produces this pairing.
        _ => 0,
    };
    stake * Coins::from(multiplier)
}

#[derive(Debug, Clone, Serialize)]
pub struct RouletteOutcome {
    pub pocket: u8,
    pub color: Option<Color>,
    pub stake: Coins,
    pub payout: Coins,
    pub net: Coins,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiceOutcome {
    pub roll: DiceRoll,
    pub stake: Coins,
    pub payout: Coins,
    pub net: Coins,
}

pub struct Games<'a> {
    store: &'a EconStore,
    config: &'a EconConfig,
    clock: &'a Clock,
}

impl<'a> Games<'a> {
    pub fn new(store: &'a EconStore, config: &'a EconConfig, clock: &'a Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn play_roulette(
        &self,
        rng: &mut TableRng,
        actor: &str,
        bet: &RouletteBet,
        stake: Coins,
    ) -> EconResult<RouletteOutcome> {
        validate_roulette_bet(bet)?;
        let pocket = rng.roulette_pocket();
        self.settle_roulette(actor, bet, stake, pocket)
    }

    /// Settle against a known pocket. Split out so tests can inject
    /// the draw.
    pub fn settle_roulette(
        &self,
        actor: &str,
        bet: &RouletteBet,
        stake: Coins,
        pocket: u8,
    ) -> EconResult<RouletteOutcome> {
        if stake <= 0 {
            return Err(EconError::InvalidAmount);
        }
        let now = self.clock.now();
        let txn = self.store.begin()?;
        Ledger::transfer_in(
            &txn,
            &Party::account(actor),
            &Party::System,
            stake,
            Category::Roulette,
            Some("roulette stake"),
            now,
        )?;
        let payout = roulette_payout(bet, stake, pocket, &self.config.roulette);
        if payout > 0 {
            Ledger::transfer_in(
                &txn,
                &Party::System,
                &Party::account(actor),
                payout,
                Category::Roulette,
                Some("roulette payout"),
                now,
            )?;
        }
        txn.commit()?;
        log::debug!("roulette actor={actor} pocket={pocket} stake={stake} payout={payout}");
        Ok(RouletteOutcome {
            pocket,
            color: pocket_color(pocket),
            stake,
            payout,
            net: payout - stake,
        })
    }

    pub fn play_dice(
        &self,
        rng: &mut TableRng,
        actor: &str,
        bet: &DiceBet,
        stake: Coins,
    ) -> EconResult<DiceOutcome> {
        validate_dice_bet(bet)?;
        let roll = match bet {
            DiceBet::Face { .. } => DiceRoll::One(rng.die()),
            DiceBet::Target { .. } => DiceRoll::Two(rng.die(), rng.die()),
        };
        self.settle_dice(actor, bet, stake, roll)
    }

    /// Settle against a known roll. Split out so tests can inject
    /// the draw.
    pub fn settle_dice(
        &self,
        actor: &str,
        bet: &DiceBet,
        stake: Coins,
        roll: DiceRoll,
    ) -> EconResult<DiceOutcome> {
        if stake <= 0 {
            return Err(EconError::InvalidAmount);
        }
        let now = self.clock.now();
        let txn = self.store.begin()?;
        Ledger::transfer_in(
            &txn,
            &Party::account(actor),
            &Party::System,
            stake,
            Category::Dice,
            Some("dice stake"),
            now,
        )?;
        let payout = dice_payout(bet, stake, roll, &self.config.dice);
        if payout > 0 {
            Ledger::transfer_in(
                &txn,
                &Party::System,
                &Party::account(actor),
                payout,
                Category::Dice,
                Some("dice payout"),
                now,
            )?;
        }
        txn.commit()?;
        log::debug!("dice actor={actor} roll={roll:?} stake={stake} payout={payout}");
        Ok(DiceOutcome {
            roll,
            stake,
            payout,
            net: payout - stake,
        })
    }
}
