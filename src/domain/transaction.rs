use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money sent to a named recipient (balance decreases)
    #[serde(rename = "transfer")]
    Transfer,
    /// A recorded balance inquiry; `amount` holds the balance at that time
    #[serde(rename = "balance")]
    BalanceSnapshot,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Transfer => "transfer",
            TransactionKind::BalanceSnapshot => "balance",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    /// Reserved for asynchronous settlement; nothing produces it yet.
    Pending,
    /// Reserved for asynchronous settlement; nothing produces it yet.
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction is an immutable entry in the account history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Transfer amount, or the balance for a snapshot
    pub amount: Amount,
    /// Set iff `kind` is `Transfer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Original transcript or a synthesized description
    pub description: String,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a completed transfer to `recipient`.
    pub fn transfer(
        amount: Amount,
        recipient: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            kind: TransactionKind::Transfer,
            amount,
            recipient: Some(recipient.into()),
            description: description.into(),
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
        }
    }

    /// Create a completed snapshot of `balance`.
    pub fn balance_snapshot(balance: Amount, description: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            kind: TransactionKind::BalanceSnapshot,
            amount: balance,
            recipient: None,
            description: description.into(),
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// Ids look like `txn_1718000000000_k3j9a0b1c`: creation millis plus a random suffix.
fn generate_id() -> TransactionId {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("txn_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
}
