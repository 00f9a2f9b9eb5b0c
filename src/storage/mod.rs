//! Key-value persistence behind the ledger.
//!
//! The ledger only needs three primitives: read one key, write several keys
//! atomically, and remove several keys atomically.

mod memory;
mod repository;

use std::future::Future;

use anyhow::Result;

pub use memory::MemoryStore;
pub use repository::Repository;

/// SQL migration for the key-value table
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Key holding the decimal-encoded balance.
pub const BALANCE_KEY: &str = "balance";

/// Key holding the JSON-encoded transaction history.
pub const TRANSACTIONS_KEY: &str = "transactions";

pub trait KeyValueStore: Send + Sync {
    /// Read a single value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Write all entries in one transaction: either every entry lands or none does.
    fn set_many(&self, entries: &[(&str, String)]) -> impl Future<Output = Result<()>> + Send;

    /// Remove all keys in one transaction. Missing keys are not an error.
    fn remove_many(&self, keys: &[&str]) -> impl Future<Output = Result<()>> + Send;
}
