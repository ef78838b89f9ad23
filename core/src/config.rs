//! Runtime configuration — rates, windows, payout tables, shop catalog.
//!
//! Defaults mirror the deployed values. Payout multipliers are
//! configuration, not constants: tiers differ per deployment, so the
//! tables load from the same JSON file as everything else.

use crate::{error::EconResult, privilege::PrivilegeKind, types::Coins};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconConfig {
    /// Fraction of the victim's balance taken by one successful
    /// theft, in whole percent.
    pub theft_rate_percent: u32,
    /// Successful thefts allowed per rolling day.
    pub theft_daily_quota: u32,
    /// The rolling "day": daily counters reset once this much time has
    /// elapsed since the last reset — never on a calendar boundary.
    pub daily_window_secs: i64,

    pub arrest_default_minutes: i64,
    pub arrest_min_minutes: i64,
    pub arrest_max_minutes: i64,
    /// One arrest per officer per this many seconds, keyed on the
    /// officer's most recent arrest action.
    pub police_cooldown_secs: i64,

    /// Sliding window for user-to-user transfers.
    pub transfer_window_secs: i64,
    /// Transfers allowed inside one trailing window.
    pub transfer_window_quota: u32,

    pub bonus_period_secs: i64,
    pub bonus_base: Coins,
    /// Additive bonus per active privilege kind; kinds stack.
    pub bonus_per_privilege: BTreeMap<PrivilegeKind, Coins>,

    pub roulette: RouletteTable,
    pub dice: DiceTable,

    /// Purchasable privileges.
    pub shop: Vec<ShopOffer>,

    /// Pending marriage/divorce requests expire after this long.
    pub request_ttl_secs: i64,
}

/// Stake multipliers. A winning stake pays stake × multiplier total
/// (stake returned plus the winnings), zero on a miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouletteTable {
    /// Straight number, zero included.
    pub straight: u32,
    pub color: u32,
    pub parity: u32,
    pub dozen: u32,
}

impl Default for RouletteTable {
    fn default() -> Self {
        Self {
            straight: 36,
            color: 2,
            parity: 2,
            dozen: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceTable {
    /// Single die, exact face.
    pub exact_face: u32,
    /// Two dice, target equals the sum.
    pub exact_sum: u32,
    /// Two dice, target equals one die but not the sum.
    pub partial: u32,
}

impl Default for DiceTable {
    fn default() -> Self {
        Self {
            exact_face: 6,
            exact_sum: 12,
            partial: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopOffer {
    pub kind: PrivilegeKind,
    pub price: Coins,
    /// None = permanent.
    pub duration_secs: Option<i64>,
}

impl Default for EconConfig {
    fn default() -> Self {
        Self {
            theft_rate_percent: 10,
            theft_daily_quota: 3,
            daily_window_secs: 24 * 3600,
            arrest_default_minutes: 180,
            arrest_min_minutes: 1,
            arrest_max_minutes: 1440,
            police_cooldown_secs: 3 * 3600,
            transfer_window_secs: 6 * 3600,
            transfer_window_quota: 5,
            bonus_period_secs: 24 * 3600,
            bonus_base: 100,
            bonus_per_privilege: BTreeMap::from([
                (PrivilegeKind::Thief, 50),
                (PrivilegeKind::Police, 75),
            ]),
            roulette: RouletteTable::default(),
            dice: DiceTable::default(),
            shop: vec![
                ShopOffer {
                    kind: PrivilegeKind::Thief,
                    price: 2_500,
                    duration_secs: Some(7 * 24 * 3600),
                },
                ShopOffer {
                    kind: PrivilegeKind::Police,
                    price: 3_500,
                    duration_secs: Some(7 * 24 * 3600),
                },
                ShopOffer {
                    kind: PrivilegeKind::Vip,
                    price: 10_000,
                    duration_secs: None,
                },
            ],
            request_ttl_secs: 24 * 3600,
        }
    }
}

impl EconConfig {
    pub fn from_json_str(raw: &str) -> EconResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: &str) -> EconResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read config {path}: {e}"))?;
        Self::from_json_str(&raw)
    }

    pub fn bonus_for(&self, kind: PrivilegeKind) -> Coins {
        self.bonus_per_privilege.get(&kind).copied().unwrap_or(0)
    }

    pub fn shop_offer(&self, kind: PrivilegeKind) -> Option<&ShopOffer> {
        self.shop.iter().find(|offer| offer.kind == kind)
    }
}
