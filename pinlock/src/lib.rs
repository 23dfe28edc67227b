//! # Pinlock
//!
//! Pinlock is the attempt-tracking and lockout core behind a PIN-entry flow:
//! it compares submitted PINs against a reference credential, counts
//! consecutive failures in a persisted ledger, locks entry after a
//! configurable number of attempts, counts the lockout down, and optionally
//! offers a biometric shortcut that bypasses the keypad entirely.
//!
//! Rendering, theming, and animation are deliberately out of scope. The host
//! application supplies:
//!
//! - a [`SecureStore`] binding (platform keychain, encrypted preferences, or
//!   the bundled [`MemoryStore`]),
//! - optionally a [`BiometricPrompt`] binding,
//! - [`PinHooks`] callbacks through which status changes, attempt counts, and
//!   the countdown are delivered for display.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pinlock::{PinResultStatus, PinlockBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pinlock = PinlockBuilder::new()
//!         .with_memory_store()
//!         .reference_pin("1234")
//!         .max_attempts(3)
//!         .lockout_duration(chrono::Duration::minutes(5))
//!         .build()
//!         .await?;
//!
//!     let outcome = pinlock.submit("0000").await?;
//!     assert_eq!(outcome.status, PinResultStatus::Failure);
//!     Ok(())
//! }
//! ```

use pinlock_core::{
    repositories::StoreLedger,
    services::{LockoutCountdown, PinService},
};

/// Re-export core types from pinlock_core
///
/// These types are commonly used when working with the Pinlock API.
pub use pinlock_core::{
    BiometricConfig, Error, LedgerKeys, PinHooks, PinLockConfig, PinResultStatus, PinState,
    SecureStore,
    services::{BiometricOutcome, BiometricPrompt, PinOutcome, format_remaining},
};

/// Re-export storage backends
#[cfg(feature = "memory")]
pub use pinlock_storage_memory::MemoryStore;

mod builder;

pub use builder::{NoStore, PinlockBuilder, WithStore};

/// A configured PIN-entry flow over a secure store.
///
/// Construct through [`PinlockBuilder`]. Owns the submission service and the
/// lockout countdown; both share one attempt ledger and one hook set.
pub struct Pinlock<S: SecureStore> {
    pin: PinService<StoreLedger<S>>,
    countdown: LockoutCountdown<StoreLedger<S>>,
    biometric: BiometricConfig,
}

impl<S: SecureStore> std::fmt::Debug for Pinlock<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pinlock")
            .field("biometric", &self.biometric)
            .finish_non_exhaustive()
    }
}

impl<S: SecureStore> Pinlock<S> {
    pub(crate) fn new(
        pin: PinService<StoreLedger<S>>,
        countdown: LockoutCountdown<StoreLedger<S>>,
        biometric: BiometricConfig,
    ) -> Self {
        Self {
            pin,
            countdown,
            biometric,
        }
    }

    /// Compare one candidate PIN. See
    /// [`PinService::submit`](pinlock_core::services::PinService::submit).
    pub async fn submit(&self, candidate: &str) -> Result<PinOutcome, Error> {
        self.pin.submit(candidate).await
    }

    /// Recover the flow state from the persisted ledger, e.g. on startup.
    pub async fn state(&self) -> Result<PinState, Error> {
        self.pin.current_state().await
    }

    /// Clear the ledger and report `initial`.
    pub async fn reset(&self) -> Result<(), Error> {
        self.pin.reset().await
    }

    /// Start the lockout countdown against the persisted lock record.
    pub async fn start_countdown(&self) -> Result<(), Error> {
        self.countdown.start().await
    }

    /// Remaining lockout time as of `now`, or `None` when nothing is locked.
    pub async fn remaining_at(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<chrono::Duration>, Error> {
        self.countdown.remaining_at(now).await
    }

    /// Offer the biometric shortcut, falling back to manual entry on any
    /// non-fatal biometric condition.
    pub async fn try_biometric<P: BiometricPrompt>(
        &self,
        prompt: &P,
    ) -> Result<Option<PinOutcome>, Error> {
        self.pin.try_biometric(prompt, &self.biometric).await
    }

    /// Forced quit action on the lockout screen. Fails loudly when no
    /// `on_quit` hook is configured.
    pub fn request_quit(&self) -> Result<(), Error> {
        self.countdown.request_quit()
    }

    /// Stop the countdown and any pending deferred notification. No hook
    /// fires after this returns.
    pub async fn shutdown(&self) {
        self.countdown.shutdown().await;
        self.pin.teardown().await;
    }
}
