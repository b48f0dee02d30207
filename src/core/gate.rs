//! Timed review lockout.
//!
//! Repeated failure opens a gate that blocks all answer submissions for a
//! fixed pause. The gate is a declarative deadline, not a timer thread:
//! callers pass an explicit `now` on every query, re-checking on each
//! interaction (or on a periodic wake) and rendering the remaining seconds.
//! Once `now` reaches the deadline the gate clears itself on the next
//! [`ReviewGate::poll`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of one review pause, in seconds. Fixed; not user-configurable.
pub const REVIEW_PAUSE_SECS: i64 = 45;

/// Lockout state for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewGate {
    /// Deadline of the lockout in force, if any. `None` means answers flow.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ReviewGate {
    /// Create an inactive gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate for [`REVIEW_PAUSE_SECS`] from `now`.
    ///
    /// Re-activating an already-open gate restarts the pause.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.expires_at = Some(now + Duration::seconds(REVIEW_PAUSE_SECS));
    }

    /// Whether the lockout is in force at `now`. Pure query.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => false,
        }
    }

    /// Seconds until the lockout expires at `now`. Zero when inactive or
    /// already expired.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.expires_at {
            Some(expires_at) => (expires_at - now).num_seconds().max(0),
            None => 0,
        }
    }

    /// Check the gate at `now`, clearing an expired deadline.
    ///
    /// Returns whether the lockout is (still) in force.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                self.expires_at = None;
            }
        }
        self.expires_at.is_some()
    }

    /// Drop any lockout immediately.
    pub fn clear(&mut self) {
        self.expires_at = None;
    }
}
