//! Caller-supplied callback hooks.
//!
//! The flow reports upward exclusively through these hooks; the host renders
//! whatever it is handed and never polls. All hooks are optional except where
//! a forced action has no safe default, which is enforced at the call site
//! rather than at construction (see
//! [`LockoutCountdown::request_quit`](crate::services::LockoutCountdown::request_quit)).

use std::fmt;
use std::sync::Arc;

use crate::{Error, status::PinResultStatus};

type Hook<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callback set observing the PIN-entry flow.
///
/// Hooks may be invoked from spawned timer tasks, so they must be `Send +
/// Sync`; they are stored behind `Arc` and cloned into those tasks.
#[derive(Default, Clone)]
pub struct PinHooks {
    pub(crate) on_status: Option<Hook<PinResultStatus>>,
    pub(crate) on_success: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    pub(crate) on_fail: Option<Hook<u32>>,
    pub(crate) on_remaining: Option<Hook<chrono::Duration>>,
    pub(crate) on_biometric_error: Option<Arc<dyn Fn(&Error) + Send + Sync>>,
    pub(crate) on_quit: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl PinHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every status change: `initial`, `success`, `failure`, `locked`.
    pub fn on_status(mut self, f: impl Fn(PinResultStatus) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Arc::new(f));
        self
    }

    /// Invoked with the accepted candidate once a comparison succeeds.
    pub fn on_success(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Invoked with the new attempt count after a failed comparison, deferred
    /// by [`failure_notice_delay`](crate::config::PinLockConfig::failure_notice_delay).
    pub fn on_fail(mut self, f: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.on_fail = Some(Arc::new(f));
        self
    }

    /// Observe the remaining lockout time, delivered once per second while a
    /// countdown runs.
    pub fn on_remaining(mut self, f: impl Fn(chrono::Duration) + Send + Sync + 'static) -> Self {
        self.on_remaining = Some(Arc::new(f));
        self
    }

    /// Receive non-fatal biometric failures. When unset they are logged at
    /// warn level instead.
    pub fn on_biometric_error(mut self, f: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_biometric_error = Some(Arc::new(f));
        self
    }

    /// Handle the forced quit action on the lockout screen. There is no safe
    /// default; requesting a quit without this handler fails loudly.
    pub fn on_quit(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_quit = Some(Arc::new(f));
        self
    }

    pub(crate) fn notify_status(&self, status: PinResultStatus) {
        if let Some(f) = &self.on_status {
            f(status);
        }
    }
}

impl fmt::Debug for PinHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinHooks")
            .field("on_status", &self.on_status.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_fail", &self.on_fail.is_some())
            .field("on_remaining", &self.on_remaining.is_some())
            .field("on_biometric_error", &self.on_biometric_error.is_some())
            .field("on_quit", &self.on_quit.is_some())
            .finish()
    }
}
