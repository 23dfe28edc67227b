//! PIN submission service: comparison, attempt counting, and lockout
//! transitions.
//!
//! # Example
//!
//! ```rust,ignore
//! use pinlock_core::services::PinService;
//!
//! let service = PinService::new(ledger, config, reference, hooks)?;
//!
//! match service.submit("1234").await?.status {
//!     PinResultStatus::Success => { /* leave the flow */ }
//!     PinResultStatus::Locked => { /* show the lockout screen */ }
//!     _ => { /* stay on the keypad */ }
//! }
//! ```

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::{
    Error,
    config::PinLockConfig,
    hooks::PinHooks,
    repositories::AttemptLedgerRepository,
    status::{PinResultStatus, PinState},
};

/// Result of one submission.
///
/// `attempts` carries the post-operation counter value: zero after success,
/// the incremented count after a failure, and the count that triggered the
/// lockout when `status` is `Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinOutcome {
    pub status: PinResultStatus,
    pub attempts: u32,
}

/// Service orchestrating PIN submission against the attempt ledger.
///
/// A mismatched candidate is normal control flow reported through
/// [`PinOutcome`]; `Err` arises only from storage failures, which propagate
/// untouched with no retry or partial-state repair.
///
/// The design assumes a single active PIN-entry flow at a time, so ledger
/// reads and writes within one submission run in strict sequence and there is
/// no cross-instance coordination.
pub struct PinService<L: AttemptLedgerRepository> {
    ledger: Arc<L>,
    config: PinLockConfig,
    pub(crate) reference: String,
    pub(crate) hooks: Arc<PinHooks>,
    // Pending deferred failure notice. Held so teardown (or a newer
    // submission) can abort it before it fires.
    pending_notice: Mutex<Option<JoinHandle<()>>>,
}

impl<L: AttemptLedgerRepository> PinService<L> {
    /// Create a new PinService.
    ///
    /// `reference` is the resolved credential candidates are compared
    /// against; resolving it from a stored key is the caller's concern.
    pub fn new(
        ledger: Arc<L>,
        config: PinLockConfig,
        reference: String,
        hooks: Arc<PinHooks>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            ledger,
            config,
            reference,
            hooks,
            pending_notice: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PinLockConfig {
        &self.config
    }

    /// Compare one candidate against the reference PIN and update the ledger.
    ///
    /// On a match both ledger records are cleared and the success hooks fire.
    /// On a mismatch the counter is incremented; reaching
    /// `max_attempts` with lockout enabled records the lock timestamp instead
    /// of the incremented counter, which deliberately leaves the stored
    /// counter one behind (the lock record alone governs the lock window).
    pub async fn submit(&self, candidate: &str) -> Result<PinOutcome, Error> {
        let prior = self.ledger.attempt_count().await?;
        let next = PinState::after_submission(
            candidate == self.reference,
            prior,
            self.config.max_attempts,
            self.config.lockout_enabled,
            Utc::now(),
        );

        match next {
            PinState::Success => {
                self.ledger.clear().await?;
                self.abort_pending_notice().await;
                self.hooks.notify_status(PinResultStatus::Success);
                if let Some(f) = &self.hooks.on_success {
                    f(candidate);
                }
                Ok(PinOutcome {
                    status: PinResultStatus::Success,
                    attempts: 0,
                })
            }
            PinState::Locked { since } => {
                self.ledger.set_locked_at(since).await?;
                let attempts = prior.saturating_add(1);
                tracing::warn!(attempts, "pin entry locked after repeated failures");
                self.hooks.notify_status(PinResultStatus::Locked);
                self.schedule_failure_notice(attempts).await;
                Ok(PinOutcome {
                    status: PinResultStatus::Locked,
                    attempts,
                })
            }
            PinState::Failure { attempts } => {
                self.ledger.set_attempt_count(attempts).await?;
                self.hooks.notify_status(PinResultStatus::Failure);
                self.schedule_failure_notice(attempts).await;
                Ok(PinOutcome {
                    status: PinResultStatus::Failure,
                    attempts,
                })
            }
            // after_submission never yields Initial.
            PinState::Initial => Ok(PinOutcome {
                status: PinResultStatus::Initial,
                attempts: prior,
            }),
        }
    }

    /// Recover the flow state from the persisted ledger.
    ///
    /// Used on startup to re-enter the lockout screen when a lock record
    /// survived a restart.
    pub async fn current_state(&self) -> Result<PinState, Error> {
        if let Some(since) = self.ledger.locked_at().await? {
            return Ok(PinState::Locked { since });
        }
        let attempts = self.ledger.attempt_count().await?;
        Ok(if attempts == 0 {
            PinState::Initial
        } else {
            PinState::Failure { attempts }
        })
    }

    /// Clear the ledger and report `initial`.
    pub async fn reset(&self) -> Result<(), Error> {
        self.ledger.clear().await?;
        self.abort_pending_notice().await;
        self.hooks.notify_status(PinResultStatus::Initial);
        Ok(())
    }

    /// Stop any pending deferred notification. No hook fires after teardown.
    pub async fn teardown(&self) {
        self.abort_pending_notice().await;
    }

    /// Defer the failure notification by the configured delay.
    ///
    /// At most one notice is pending at a time; a newer submission replaces
    /// an unfired one so the hook only ever reports the latest count.
    async fn schedule_failure_notice(&self, attempts: u32) {
        let Some(hook) = self.hooks.on_fail.clone() else {
            return;
        };
        let delay = self.config.failure_notice_delay;

        let mut pending = self.pending_notice.lock().await;
        if let Some(old) = pending.take() {
            old.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            hook(attempts);
        }));
    }

    async fn abort_pending_notice(&self) {
        if let Some(handle) = self.pending_notice.lock().await.take() {
            handle.abort();
        }
    }
}

impl<L: AttemptLedgerRepository> Drop for PinService<L> {
    fn drop(&mut self) {
        // Drop cannot await; try_lock always succeeds here because no task
        // other than the owner holds the service at this point.
        if let Ok(mut pending) = self.pending_notice.try_lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}
