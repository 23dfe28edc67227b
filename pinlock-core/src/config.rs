//! Configuration for the PIN-entry flow.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};

/// Names of the two persisted records in the secure store.
///
/// The counter and the lock timestamp live under caller-supplied keys so
/// multiple flows (or multiple profiles) can coexist in one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerKeys {
    /// Key under which the failed-attempt counter is stored.
    pub attempts: String,
    /// Key under which the lockout start instant is stored.
    pub locked_at: String,
}

impl Default for LedgerKeys {
    fn default() -> Self {
        Self {
            attempts: "pin_attempts".to_string(),
            locked_at: "pin_locked_at".to_string(),
        }
    }
}

/// Configuration for attempt counting and lockout behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinLockConfig {
    /// Number of consecutive failed comparisons that triggers a lockout.
    /// Must be at least 1.
    pub max_attempts: u32,

    /// How long entry stays disabled once a lockout begins. Serialized as
    /// whole seconds.
    #[serde(with = "duration_seconds")]
    pub lockout_duration: chrono::Duration,

    /// When false the counter grows without bound and the flow never locks.
    pub lockout_enabled: bool,

    /// Delay before the failure notification hook fires with the new attempt
    /// count. The notification is deliberately deferred, not synchronous.
    pub failure_notice_delay: std::time::Duration,

    /// Storage keys for the attempt counter and lock timestamp.
    pub keys: LedgerKeys,
}

impl Default for PinLockConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            lockout_duration: chrono::Duration::minutes(5),
            lockout_enabled: true,
            failure_notice_delay: std::time::Duration::from_millis(1500),
            keys: LedgerKeys::default(),
        }
    }
}

impl PinLockConfig {
    /// Validate the configuration.
    ///
    /// A `max_attempts` of zero would lock on a flow that never had a chance
    /// to fail, so it is rejected outright.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts.into());
        }
        Ok(())
    }
}

mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        duration: &chrono::Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<chrono::Duration, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Ok(chrono::Duration::seconds(seconds))
    }
}

/// Text shown by the platform biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricConfig {
    pub prompt_message: String,
    pub cancel_label: String,
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            prompt_message: "Unlock with biometrics".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}
