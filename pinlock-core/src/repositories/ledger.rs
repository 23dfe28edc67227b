//! Repository for the attempt ledger.
//!
//! The ledger is two persisted records: a non-negative counter of consecutive
//! failed comparisons and an optional timestamp marking when a lockout began.
//! Both are created lazily on first failure or lockout and destroyed together
//! on success or lock expiry, never otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    config::LedgerKeys,
    error::StorageError,
    storage::SecureStore,
};

/// Storage operations for the attempt counter and the lock record.
///
/// Implementations must treat an absent counter as zero and must not require
/// the counter to exist before a lockout can be recorded: the call that
/// triggers a lockout persists only the lock timestamp, leaving the counter
/// at its previous stored value.
#[async_trait]
pub trait AttemptLedgerRepository: Send + Sync + 'static {
    /// Current failed-attempt count. Absent record means zero.
    async fn attempt_count(&self) -> Result<u32, Error>;

    /// Persist the failed-attempt count.
    async fn set_attempt_count(&self, count: u32) -> Result<(), Error>;

    /// Instant the current lockout began, if one is recorded.
    async fn locked_at(&self) -> Result<Option<DateTime<Utc>>, Error>;

    /// Record the start of a lockout window.
    async fn set_locked_at(&self, at: DateTime<Utc>) -> Result<(), Error>;

    /// Delete both records. The two deletes run in sequence, counter first;
    /// there is no transaction, matching the single-flow usage model.
    async fn clear(&self) -> Result<(), Error>;
}

/// [`AttemptLedgerRepository`] backed by a [`SecureStore`] and two configured
/// key names.
///
/// The counter is stored as decimal text and the lock instant as an RFC 3339
/// timestamp, so the records stay readable by the host platform's own
/// tooling.
pub struct StoreLedger<S: SecureStore> {
    store: Arc<S>,
    keys: LedgerKeys,
}

impl<S: SecureStore> StoreLedger<S> {
    pub fn new(store: Arc<S>, keys: LedgerKeys) -> Self {
        Self { store, keys }
    }
}

#[async_trait]
impl<S: SecureStore> AttemptLedgerRepository for StoreLedger<S> {
    async fn attempt_count(&self) -> Result<u32, Error> {
        match self.store.get(&self.keys.attempts).await? {
            None => Ok(0),
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                StorageError::Corrupt(format!(
                    "attempt counter under `{}` is not a number: {raw:?}",
                    self.keys.attempts
                ))
                .into()
            }),
        }
    }

    async fn set_attempt_count(&self, count: u32) -> Result<(), Error> {
        self.store
            .set(&self.keys.attempts, &count.to_string())
            .await
    }

    async fn locked_at(&self) -> Result<Option<DateTime<Utc>>, Error> {
        match self.store.get(&self.keys.locked_at).await? {
            None => Ok(None),
            Some(raw) => {
                let parsed = DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| {
                    StorageError::Corrupt(format!(
                        "lock record under `{}` is not a timestamp: {e}",
                        self.keys.locked_at
                    ))
                })?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
        }
    }

    async fn set_locked_at(&self, at: DateTime<Utc>) -> Result<(), Error> {
        self.store
            .set(&self.keys.locked_at, &at.to_rfc3339())
            .await
    }

    async fn clear(&self) -> Result<(), Error> {
        self.store.delete(&self.keys.attempts).await?;
        self.store.delete(&self.keys.locked_at).await?;
        Ok(())
    }
}
