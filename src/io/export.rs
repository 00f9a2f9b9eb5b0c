use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::Ledger;
use crate::domain::{Amount, Transaction};
use crate::storage::KeyValueStore;

/// Account snapshot for full JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub balance: Amount,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting account data to various formats
pub struct Exporter<'a, S> {
    ledger: &'a Ledger<S>,
}

impl<'a, S: KeyValueStore> Exporter<'a, S> {
    pub fn new(ledger: &'a Ledger<S>) -> Self {
        Self { ledger }
    }

    /// Export the transaction history to CSV format, newest first
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.ledger.transactions().await;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "type",
            "amount",
            "recipient",
            "description",
            "status",
        ])?;

        for txn in &transactions {
            let date = txn.timestamp.to_rfc3339();
            let amount = txn.amount.to_string();
            csv_writer.write_record([
                txn.id.as_str(),
                date.as_str(),
                txn.kind.as_str(),
                amount.as_str(),
                txn.recipient.as_deref().unwrap_or_default(),
                txn.description.as_str(),
                txn.status.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export balance and history as a JSON document
    pub async fn export_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let snapshot = AccountSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            balance: self.ledger.balance().await,
            transactions: self.ledger.transactions().await,
        };

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        Ok(snapshot.transactions.len())
    }
}
