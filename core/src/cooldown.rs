//! Per-actor throttle windows.
//!
//! Two shapes: fixed-cooldown actions keep a single latest timestamp
//! per (actor, action); quota actions keep individual timestamps and
//! count them over a trailing window. Both live in the store so every
//! process instance sees the same state.

use crate::{
    error::{EconError, EconResult},
    store::StoreTxn,
    types::UnixTime,
};

pub const ACTION_ARREST: &str = "arrest";
pub const ACTION_TRANSFER: &str = "transfer";

/// Check a fixed cooldown and stamp the new action time in the same
/// transaction. Fails with the remaining wait.
pub fn check_and_touch(
    txn: &StoreTxn<'_>,
    account_id: &str,
    action: &str,
    cooldown_secs: i64,
    now: UnixTime,
) -> EconResult<()> {
    if let Some(last) = txn.last_action_at(account_id, action)? {
        let elapsed = now - last;
        if elapsed < cooldown_secs {
            return Err(EconError::CooldownActive {
                remaining_secs: cooldown_secs - elapsed,
            });
        }
    }
    txn.touch_action(account_id, action, now)?;
    Ok(())
}
