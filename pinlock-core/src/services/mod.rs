//! Service layer for the PIN-entry flow
//!
//! This module contains the concrete services that encapsulate submission,
//! lockout countdown, and biometric-shortcut logic on top of the repository
//! layer.

pub mod biometric;
pub mod countdown;
pub mod pin;

pub use biometric::{BiometricOutcome, BiometricPrompt};
pub use countdown::{LockoutCountdown, format_remaining};
pub use pin::{PinOutcome, PinService};
