//! Core functionality for the pinlock project
//!
//! This crate contains the attempt-tracking and lockout state machine behind a
//! PIN-entry flow, independent of any rendering layer or platform storage
//! binding.
//!
//! The crate is organized in three layers:
//!
//! - [`storage`] defines the [`SecureStore`](storage::SecureStore) capability,
//!   an abstract asynchronous key-value store supplied by the host platform.
//! - [`repositories`] binds the two persisted records (the failed-attempt
//!   counter and the lock timestamp) to a store through the
//!   [`AttemptLedgerRepository`](repositories::AttemptLedgerRepository) trait.
//! - [`services`] implements the behavior: PIN submission and attempt counting
//!   ([`PinService`](services::PinService)), the lockout countdown
//!   ([`LockoutCountdown`](services::LockoutCountdown)), and the optional
//!   biometric shortcut ([`BiometricPrompt`](services::BiometricPrompt)).
//!
//! Callers observe the flow through [`PinHooks`](hooks::PinHooks) callbacks
//! rather than polling; the single externally observable value is
//! [`PinResultStatus`](status::PinResultStatus).

pub mod config;
pub mod error;
pub mod hooks;
pub mod repositories;
pub mod services;
pub mod status;
pub mod storage;

pub use config::{BiometricConfig, LedgerKeys, PinLockConfig};
pub use error::Error;
pub use hooks::PinHooks;
pub use status::{PinResultStatus, PinState};
pub use storage::SecureStore;
