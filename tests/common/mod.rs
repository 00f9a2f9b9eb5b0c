// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;
use voicepay::Repository;
use voicepay::application::{Ledger, LedgerConfig};
use voicepay::domain::Amount;

/// Helper to create a ledger backed by a temporary SQLite database
pub async fn test_ledger() -> Result<(Ledger<Repository>, TempDir)> {
    test_ledger_with_balance(voicepay::domain::DEFAULT_BALANCE).await
}

/// Same as [`test_ledger`] with a custom initial balance
pub async fn test_ledger_with_balance(balance: Amount) -> Result<(Ledger<Repository>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let ledger = open_ledger(&db_path(&temp_dir), balance).await?;
    Ok((ledger, temp_dir))
}

/// Open another ledger on an existing database file, as a restarted process would
pub async fn open_ledger(path: &Path, balance: Amount) -> Result<Ledger<Repository>> {
    let repo = Repository::open(path.to_str().unwrap()).await?;
    Ok(Ledger::new(
        repo,
        LedgerConfig::immediate().with_initial_balance(balance),
    ))
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}
