//! Arrest state machine and the police cooldown.
//!
//! Per target: Free or Arrested(release_time). Arrested decays to
//! Free the instant now >= release_time — evaluated on every read, so
//! no background timer is needed for correctness; the periodic sweep
//! only clears dead rows. A second machine paces officers: one arrest
//! per officer per cooldown, keyed on their latest arrest action.

use crate::{
    clock::Clock,
    config::EconConfig,
    cooldown::{self, ACTION_ARREST},
    error::{EconError, EconResult},
    privilege::PrivilegeKind,
    store::EconStore,
    types::{AccountId, UnixTime},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ArrestRow {
    pub account_id: AccountId,
    pub officer_id: AccountId,
    pub arrested_at: UnixTime,
    pub release_at: UnixTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrestOutcome {
    pub target: AccountId,
    pub minutes: i64,
    pub release_at: UnixTime,
}

pub struct Arrests<'a> {
    store: &'a EconStore,
    config: &'a EconConfig,
    clock: &'a Clock,
}

impl<'a> Arrests<'a> {
    pub fn new(store: &'a EconStore, config: &'a EconConfig, clock: &'a Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn is_arrested(&self, account_id: &str) -> EconResult<bool> {
        Ok(self
            .store
            .active_arrest(account_id, self.clock.now())?
            .is_some())
    }

    pub fn active(&self, account_id: &str) -> EconResult<Option<ArrestRow>> {
        self.store.active_arrest(account_id, self.clock.now())
    }

    /// Arrest `target` for a duration parsed from free-form input.
    pub fn arrest(&self, officer: &str, target: &str, duration_args: &str) -> EconResult<ArrestOutcome> {
        let now = self.clock.now();

        if !self
            .store
            .has_active_privilege(officer, PrivilegeKind::Police, now)?
        {
            return Err(EconError::denied("police privilege required"));
        }
        if officer == target {
            return Err(EconError::denied("cannot arrest yourself"));
        }
        if !self
            .store
            .has_active_privilege(target, PrivilegeKind::Thief, now)?
        {
            return Err(EconError::denied("target holds no thief privilege"));
        }

        let minutes = parse_duration_minutes(duration_args)
            .unwrap_or(self.config.arrest_default_minutes)
            .clamp(self.config.arrest_min_minutes, self.config.arrest_max_minutes);

        let txn = self.store.begin()?;

        // Re-validate under the write lock.
        if txn.active_arrest(target, now)?.is_some() {
            return Err(EconError::already("target is already arrested"));
        }
        cooldown::check_and_touch(
            &txn,
            officer,
            ACTION_ARREST,
            self.config.police_cooldown_secs,
            now,
        )?;

        // A released-but-unswept row may still occupy the slot.
        txn.clear_arrest(target)?;
        let row = ArrestRow {
            account_id: target.to_string(),
            officer_id: officer.to_string(),
            arrested_at: now,
            release_at: now + minutes * 60,
        };
        txn.insert_arrest(&row)?;
        txn.commit()?;

        log::debug!("arrest {officer} -> {target}: {minutes}min");
        Ok(ArrestOutcome {
            target: target.to_string(),
            minutes,
            release_at: row.release_at,
        })
    }

    /// Drop released rows. Returns how many were swept.
    pub fn sweep_released(&self) -> EconResult<usize> {
        self.store.sweep_released_arrests(self.clock.now())
    }
}

/// Parse a free-form duration with compound day/hour/minute units:
/// "2h30m", "1d 4h", "90", "45 min". Returns total minutes, or None
/// when nothing parseable is present. Callers clamp the result.
pub fn parse_duration_minutes(raw: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut matched = false;
    let mut pending: Option<i64> = None;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(d) = c.to_digit(10) {
            let mut value = d as i64;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                value = (value * 10 + d as i64).min(1_000_000);
                chars.next();
            }
            // Two bare numbers in a row: the earlier one counts as minutes.
            if let Some(prev) = pending.take() {
                total += prev;
                matched = true;
            }
            pending = Some(value);
        } else if c.is_alphabetic() {
            let mut unit = String::new();
            unit.push(c.to_ascii_lowercase());
            while let Some(a) = chars.peek().filter(|c| c.is_alphabetic()) {
                unit.push(a.to_ascii_lowercase());
                chars.next();
            }
            if let Some(value) = pending.take() {
                let scaled = match unit.bytes().next() {
                    Some(b'd') => Some(value * 24 * 60),
                    Some(b'h') => Some(value * 60),
                    Some(b'm') => Some(value),
                    _ => None, // unknown unit drops its number
                };
                if let Some(minutes) = scaled {
                    total += minutes;
                    matched = true;
                }
            }
        }
        // separators and punctuation fall through
    }
    if let Some(value) = pending {
        total += value; // trailing bare number = minutes
        matched = true;
    }

    matched.then_some(total)
}
