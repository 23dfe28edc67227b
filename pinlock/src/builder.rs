//! Builder pattern for constructing [`Pinlock`] instances
//!
//! The builder uses a type-state pattern so a store must be configured before
//! building, checked at compile time.
//!
//! # Example
//!
//! ```rust,no_run
//! use pinlock::{PinHooks, PinlockBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pinlock = PinlockBuilder::new()
//!         .with_memory_store()
//!         .reference_pin("1234")
//!         .max_attempts(3)
//!         .hooks(PinHooks::new().on_status(|status| println!("{status}")))
//!         .build()
//!         .await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use pinlock_core::{
    BiometricConfig, Error, LedgerKeys, PinHooks, PinLockConfig,
    error::AuthError,
    repositories::StoreLedger,
    services::{LockoutCountdown, PinService},
    storage::SecureStore,
};

use crate::Pinlock;

/// Marker type indicating no store has been configured yet.
///
/// This is the initial state of [`PinlockBuilder`].
pub struct NoStore;

/// Marker type indicating a store has been configured.
pub struct WithStore<S: SecureStore> {
    store: Arc<S>,
}

/// Where the reference PIN comes from.
enum CredentialSource {
    /// Supplied directly by the caller.
    Direct(String),
    /// Read from the secure store under this key at build time.
    StoredKey(String),
}

/// A type-safe builder for constructing [`Pinlock`] instances.
///
/// # Type States
///
/// - [`NoStore`]: initial state, a store must be configured
/// - [`WithStore<S>`]: store configured, ready to build
pub struct PinlockBuilder<Store> {
    store: Store,
    config: PinLockConfig,
    biometric: BiometricConfig,
    hooks: PinHooks,
    credential: Option<CredentialSource>,
}

impl PinlockBuilder<NoStore> {
    pub fn new() -> Self {
        Self {
            store: NoStore,
            config: PinLockConfig::default(),
            biometric: BiometricConfig::default(),
            hooks: PinHooks::new(),
            credential: None,
        }
    }

    /// Use the given secure store binding.
    pub fn with_store<S: SecureStore>(self, store: S) -> PinlockBuilder<WithStore<S>> {
        PinlockBuilder {
            store: WithStore {
                store: Arc::new(store),
            },
            config: self.config,
            biometric: self.biometric,
            hooks: self.hooks,
            credential: self.credential,
        }
    }

    /// Use the in-memory store. Nothing persists across the process.
    #[cfg(feature = "memory")]
    pub fn with_memory_store(
        self,
    ) -> PinlockBuilder<WithStore<pinlock_storage_memory::MemoryStore>> {
        self.with_store(pinlock_storage_memory::MemoryStore::new())
    }
}

impl Default for PinlockBuilder<NoStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Store> PinlockBuilder<Store> {
    /// Number of consecutive failures that triggers a lockout. Must be ≥ 1.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// How long entry stays disabled once locked.
    pub fn lockout_duration(mut self, duration: chrono::Duration) -> Self {
        self.config.lockout_duration = duration;
        self
    }

    /// Disable the lockout entirely; the counter then grows without bound.
    pub fn lockout_disabled(mut self) -> Self {
        self.config.lockout_enabled = false;
        self
    }

    /// Delay before the deferred failure notification fires.
    pub fn failure_notice_delay(mut self, delay: std::time::Duration) -> Self {
        self.config.failure_notice_delay = delay;
        self
    }

    /// Storage keys for the attempt counter and lock timestamp.
    pub fn ledger_keys(mut self, keys: LedgerKeys) -> Self {
        self.config.keys = keys;
        self
    }

    /// Supply the reference PIN directly.
    pub fn reference_pin(mut self, pin: impl Into<String>) -> Self {
        self.credential = Some(CredentialSource::Direct(pin.into()));
        self
    }

    /// Resolve the reference PIN from the secure store under `key` at build
    /// time.
    pub fn stored_credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential = Some(CredentialSource::StoredKey(key.into()));
        self
    }

    /// Text shown by the platform biometric prompt.
    pub fn biometric_config(mut self, biometric: BiometricConfig) -> Self {
        self.biometric = biometric;
        self
    }

    /// Callback hooks observing the flow.
    pub fn hooks(mut self, hooks: PinHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

impl<S: SecureStore> PinlockBuilder<WithStore<S>> {
    /// Build the configured [`Pinlock`] instance.
    ///
    /// Validates the configuration and resolves the reference credential; a
    /// stored-key credential that is absent from the store fails here with
    /// [`AuthError::MissingCredential`], before any submission can run.
    pub async fn build(self) -> Result<Pinlock<S>, Error> {
        self.config.validate()?;

        let store = self.store.store;
        let reference = match self.credential {
            Some(CredentialSource::Direct(pin)) => pin,
            Some(CredentialSource::StoredKey(key)) => {
                tracing::debug!(key = %key, "resolving reference PIN from secure store");
                store
                    .get(&key)
                    .await?
                    .ok_or(Error::Auth(AuthError::MissingCredential))?
            }
            None => return Err(AuthError::MissingCredential.into()),
        };

        let ledger = Arc::new(StoreLedger::new(store, self.config.keys.clone()));
        let hooks = Arc::new(self.hooks);
        let lockout_duration = self.config.lockout_duration;

        let pin = PinService::new(
            Arc::clone(&ledger),
            self.config,
            reference,
            Arc::clone(&hooks),
        )?;
        let countdown = LockoutCountdown::new(ledger, lockout_duration, hooks);

        Ok(Pinlock::new(pin, countdown, self.biometric))
    }
}
