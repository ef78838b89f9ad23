//! Shared primitive types used across the economy core.

/// Exact-integer coin amount. `i128` gives 38 decimal digits of
/// headroom; balances are persisted as TEXT and parsed back — never
/// floating point.
pub type Coins = i128;

/// Stable external identifier for an account, as delivered by the
/// Messaging Gateway (a chat-platform user id).
pub type AccountId = String;

/// Wall-clock instant in whole unix seconds.
pub type UnixTime = i64;

/// Reserved identity for the house side of a coin movement.
/// Never a valid actor — dispatch rejects commands issued under it.
pub const SYSTEM_ACTOR: &str = "system";
