use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Biometric error: {0}")]
    Biometric(#[from] BiometricError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors in resolving the reference credential.
///
/// A mismatched PIN is never an error; comparison outcomes are reported
/// through [`PinResultStatus`](crate::status::PinResultStatus) instead.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No reference PIN was supplied and none is stored under the configured key")]
    MissingCredential,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store operation failed: {0}")]
    Backend(String),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("Biometric hardware is not available")]
    Unavailable,

    #[error("Biometric prompt was cancelled")]
    Cancelled,

    #[error("Biometric prompt failed: {0}")]
    Prompt(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_attempts must be at least 1")]
    InvalidMaxAttempts,

    #[error("Required handler `{0}` is not configured and has no safe default")]
    MissingHandler(&'static str),
}
