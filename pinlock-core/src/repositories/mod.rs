//! Repository traits for data access
//!
//! This module defines the repository interface that services use to read and
//! mutate the persisted attempt ledger, providing a clean abstraction over
//! the underlying [`SecureStore`](crate::storage::SecureStore) binding.

pub mod ledger;

pub use ledger::{AttemptLedgerRepository, StoreLedger};
