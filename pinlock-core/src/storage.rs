//! Abstract secure key-value storage capability.

use async_trait::async_trait;

use crate::Error;

/// Asynchronous key-value store supplied by the host platform.
///
/// Implementations are expected to back this with whatever secure storage the
/// platform offers (a keychain, an encrypted preference store, or an
/// in-memory map in tests). The core never assumes anything beyond get, set,
/// and delete by string key.
///
/// Deleting a key that is absent is not an error. Backend failures surface as
/// [`StorageError`](crate::error::StorageError) and are never retried
/// internally; the caller decides how to recover.
#[async_trait]
pub trait SecureStore: Send + Sync + 'static {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the value under `key`. A no-op when the key is absent.
    async fn delete(&self, key: &str) -> Result<(), Error>;
}
