use std::future::{self, Future};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    AccountState, Amount, Transaction, TransactionRequest, sort_newest_first, total_sent,
};
use crate::storage::{BALANCE_KEY, KeyValueStore, TRANSACTIONS_KEY};

use super::{LedgerConfig, LedgerError};

/// Owns the account balance and transaction history.
///
/// Construct one per process and share it by reference (or `Arc`). Reads go
/// straight to the store; every mutation is serialized through a single
/// writer lock, so two concurrent transfers can never both spend the same
/// balance. Mutations only proceed from state that was actually read.
pub struct Ledger<S> {
    store: S,
    config: LedgerConfig,
    writer: Mutex<()>,
}

/// Overview of the account
pub struct AccountSummary {
    pub balance: Amount,
    pub total_sent: Amount,
    pub transfer_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

impl<S: KeyValueStore> Ledger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            writer: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current balance. Falls back to the initial balance when nothing is
    /// stored or the stored value cannot be read.
    pub async fn balance(&self) -> Amount {
        match self.read_balance().await {
            Ok(Some(balance)) => balance,
            Ok(None) => self.config.initial_balance,
            Err(e) => {
                warn!("Error reading balance, using default: {:#}", e);
                self.config.initial_balance
            }
        }
    }

    /// Transaction history, newest first. Empty when nothing is stored or the
    /// stored history cannot be read.
    pub async fn transactions(&self) -> Vec<Transaction> {
        match self.read_transactions().await {
            Ok(mut history) => {
                sort_newest_first(&mut history);
                history
            }
            Err(e) => {
                warn!("Error reading transactions, treating history as empty: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Validate and apply a request, persisting balance and history together.
    pub async fn apply(&self, request: TransactionRequest) -> Result<Transaction, LedgerError> {
        self.apply_with_cancel(request, future::pending()).await
    }

    /// Like [`Ledger::apply`], but gives up with [`LedgerError::Cancelled`] if
    /// `cancel` completes during the settlement delay. Nothing is written in
    /// that case.
    pub async fn apply_with_cancel<C>(
        &self,
        request: TransactionRequest,
        cancel: C,
    ) -> Result<Transaction, LedgerError>
    where
        C: Future<Output = ()>,
    {
        let _writer = self.writer.lock().await;
        debug!(kind = %request.kind(), "Processing request");

        if matches!(request, TransactionRequest::Transfer { .. })
            && !self.config.settlement_delay.is_zero()
        {
            tokio::select! {
                _ = tokio::time::sleep(self.config.settlement_delay) => {}
                _ = cancel => {
                    info!("Request cancelled during settlement");
                    return Err(LedgerError::Cancelled);
                }
            }
        }

        let mut state = self.load_state().await.map_err(|e| {
            warn!("Error reading account state, request not applied: {:#}", e);
            LedgerError::StorageRead(e)
        })?;
        let transaction = state.apply(&request).map_err(|e| {
            info!("Request rejected: {}", e);
            LedgerError::from(e)
        })?;

        self.persist(&state)
            .await
            .map_err(LedgerError::StorageWrite)?;

        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            balance = state.balance,
            "Applied transaction"
        );
        Ok(transaction)
    }

    /// Forget balance and history. The next read returns the defaults.
    pub async fn reset_account(&self) -> Result<(), LedgerError> {
        let _writer = self.writer.lock().await;
        self.store
            .remove_many(&[TRANSACTIONS_KEY, BALANCE_KEY])
            .await
            .map_err(LedgerError::StorageWrite)?;
        info!("Account reset");
        Ok(())
    }

    pub async fn summary(&self) -> AccountSummary {
        let balance = self.balance().await;
        let history = self.transactions().await;

        AccountSummary {
            balance,
            total_sent: total_sent(&history),
            transfer_count: history.iter().filter(|t| t.is_transfer()).count(),
            last_activity: history.first().map(|t| t.timestamp),
        }
    }

    /// Unlike the public reads, a failure here aborts the write.
    async fn load_state(&self) -> Result<AccountState> {
        let balance = self
            .read_balance()
            .await?
            .unwrap_or(self.config.initial_balance);
        let mut history = self.read_transactions().await?;
        sort_newest_first(&mut history);

        Ok(AccountState { balance, history })
    }

    async fn persist(&self, state: &AccountState) -> Result<()> {
        let history =
            serde_json::to_string(&state.history).context("Failed to encode transactions")?;
        self.store
            .set_many(&[
                (BALANCE_KEY, state.balance.to_string()),
                (TRANSACTIONS_KEY, history),
            ])
            .await
    }

    async fn read_balance(&self) -> Result<Option<Amount>> {
        self.store
            .get(BALANCE_KEY)
            .await?
            .map(|raw| {
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid stored balance: {:?}", raw))
            })
            .transpose()
    }

    async fn read_transactions(&self) -> Result<Vec<Transaction>> {
        match self.store.get(TRANSACTIONS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).context("Invalid stored transactions"),
            None => Ok(Vec::new()),
        }
    }
}
