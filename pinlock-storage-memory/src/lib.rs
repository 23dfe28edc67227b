//! In-memory [`SecureStore`] backend.
//!
//! Backs the store with a [`DashMap`], making it safe to share across tasks
//! without explicit locking. Nothing survives the process: this backend is
//! meant for tests, examples, and hosts that wire in a platform keychain
//! later.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use pinlock_core::{Error, SecureStore};

/// A [`SecureStore`] that keeps every record in process memory.
///
/// Cloning is cheap and clones share the same underlying map, mirroring how a
/// real platform store is one shared resource behind many handles.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}
