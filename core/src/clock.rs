//! Wall-clock source — system time in production, pinned in tests.
//!
//! Every window in the economy is elapsed-time (never a calendar
//! boundary), so the whole core runs off unix seconds from one Clock.

use crate::types::UnixTime;

#[derive(Debug, Clone)]
pub struct Clock {
    pinned: Option<UnixTime>,
}

impl Clock {
    /// Real wall clock.
    pub fn system() -> Self {
        Self { pinned: None }
    }

    /// Pinned clock for tests. Time only moves via `advance()`.
    pub fn fixed(now: UnixTime) -> Self {
        Self { pinned: Some(now) }
    }

    pub fn now(&self) -> UnixTime {
        match self.pinned {
            Some(t) => t,
            None => chrono::Utc::now().timestamp(),
        }
    }

    /// Move a pinned clock forward.
    /// Panics on a system clock — callers must check.
    pub fn advance(&mut self, secs: i64) {
        match &mut self.pinned {
            Some(t) => *t += secs,
            None => panic!("advance() called on a system clock"),
        }
    }
}
