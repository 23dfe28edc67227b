//! Result status and the explicit submission state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally observable outcome of the most recent comparison attempt, or
/// the current screen state.
///
/// This is the single value that drives UI swapping in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinResultStatus {
    Initial,
    Success,
    Failure,
    Locked,
}

impl fmt::Display for PinResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinResultStatus::Initial => write!(f, "initial"),
            PinResultStatus::Success => write!(f, "success"),
            PinResultStatus::Failure => write!(f, "failure"),
            PinResultStatus::Locked => write!(f, "locked"),
        }
    }
}

/// Tagged state of the PIN-entry flow.
///
/// Transitions: `Initial` and `Failure` may move to any of `Success`,
/// `Failure`, or `Locked` via [`PinState::after_submission`]. `Locked` moves
/// back to `Initial` only through lockout expiry
/// ([`LockoutCountdown`](crate::services::LockoutCountdown)). `Success` is
/// terminal for the attempt; the caller is expected to leave the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Initial,
    Success,
    Failure {
        /// Consecutive failed comparisons so far.
        attempts: u32,
    },
    Locked {
        /// Instant the lockout window began.
        since: DateTime<Utc>,
    },
}

impl PinState {
    /// Compute the state following one comparison attempt.
    ///
    /// `prior_attempts` is the persisted counter before this attempt. The
    /// returned state is never `Initial`: a submission always resolves to
    /// success, failure, or lockout.
    pub fn after_submission(
        matched: bool,
        prior_attempts: u32,
        max_attempts: u32,
        lockout_enabled: bool,
        now: DateTime<Utc>,
    ) -> PinState {
        if matched {
            return PinState::Success;
        }

        let attempts = prior_attempts.saturating_add(1);
        if attempts >= max_attempts && lockout_enabled {
            PinState::Locked { since: now }
        } else {
            PinState::Failure { attempts }
        }
    }

    /// Project onto the externally observable status.
    pub fn status(&self) -> PinResultStatus {
        match self {
            PinState::Initial => PinResultStatus::Initial,
            PinState::Success => PinResultStatus::Success,
            PinState::Failure { .. } => PinResultStatus::Failure,
            PinState::Locked { .. } => PinResultStatus::Locked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_always_succeeds() {
        let now = Utc::now();
        for prior in [0, 1, 99] {
            let state = PinState::after_submission(true, prior, 3, true, now);
            assert_eq!(state, PinState::Success);
        }
    }

    #[test]
    fn test_mismatch_below_threshold_is_failure() {
        let now = Utc::now();
        let state = PinState::after_submission(false, 0, 3, true, now);
        assert_eq!(state, PinState::Failure { attempts: 1 });
        assert_eq!(state.status(), PinResultStatus::Failure);
    }

    #[test]
    fn test_mismatch_at_threshold_locks() {
        let now = Utc::now();
        let state = PinState::after_submission(false, 2, 3, true, now);
        assert_eq!(state, PinState::Locked { since: now });
        assert_eq!(state.status(), PinResultStatus::Locked);
    }

    #[test]
    fn test_lockout_disabled_never_locks() {
        let now = Utc::now();
        let state = PinState::after_submission(false, 500, 3, false, now);
        assert_eq!(state, PinState::Failure { attempts: 501 });
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&PinResultStatus::Locked).unwrap();
        assert_eq!(json, "\"locked\"");
    }
}
