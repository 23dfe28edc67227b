//! Biometric shortcut: an alternate, counter-bypassing path to the success
//! state.
//!
//! A verified biometric prompt is treated exactly like a matching manual
//! submission. Everything else about it is non-fatal: missing hardware,
//! cancellation, and prompt errors fall back to manual entry and never touch
//! the attempt ledger.

use async_trait::async_trait;

use crate::{
    Error,
    config::BiometricConfig,
    error::BiometricError,
    repositories::AttemptLedgerRepository,
    services::pin::{PinOutcome, PinService},
};

/// Outcome of a completed biometric prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricOutcome {
    /// The device verified the user.
    Verified,
    /// The user dismissed the prompt.
    Cancelled,
}

/// Platform biometric prompt capability.
///
/// The host supplies the concrete binding (fingerprint reader, face
/// unlock, a stub in tests); the core only asks whether hardware exists and
/// whether a prompt verified the user.
#[async_trait]
pub trait BiometricPrompt: Send + Sync + 'static {
    /// Whether biometric hardware is present and enrolled.
    async fn hardware_available(&self) -> Result<bool, Error>;

    /// Show the platform prompt and wait for the user.
    async fn authenticate(
        &self,
        prompt: &str,
        cancel_label: &str,
    ) -> Result<BiometricOutcome, Error>;
}

impl<L: AttemptLedgerRepository> PinService<L> {
    /// Offer the biometric shortcut.
    ///
    /// Returns `Ok(Some(outcome))` when the prompt verified the user and the
    /// success path ran (ledger cleared, `success` reported), or `Ok(None)`
    /// when the flow should fall back to manual entry. Only a storage failure
    /// on the success path is an `Err`.
    pub async fn try_biometric<P: BiometricPrompt>(
        &self,
        prompt: &P,
        config: &BiometricConfig,
    ) -> Result<Option<PinOutcome>, Error> {
        match prompt.hardware_available().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("no biometric hardware, falling back to manual entry");
                return Ok(None);
            }
            Err(e) => {
                self.report_biometric_error(&e);
                return Ok(None);
            }
        }

        match prompt
            .authenticate(&config.prompt_message, &config.cancel_label)
            .await
        {
            Ok(BiometricOutcome::Verified) => {
                // Equivalent to a matching manual submission.
                let reference = self.reference.clone();
                let outcome = self.submit(&reference).await?;
                Ok(Some(outcome))
            }
            Ok(BiometricOutcome::Cancelled) => {
                self.report_biometric_error(&BiometricError::Cancelled.into());
                Ok(None)
            }
            Err(e) => {
                self.report_biometric_error(&e);
                Ok(None)
            }
        }
    }

    fn report_biometric_error(&self, err: &Error) {
        match &self.hooks.on_biometric_error {
            Some(f) => f(err),
            None => tracing::warn!(error = %err, "biometric authentication failed"),
        }
    }
}
