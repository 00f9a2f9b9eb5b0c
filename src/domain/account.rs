use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Amount, Intent, Transaction, TransactionKind};

/// Balance handed out before anything has been persisted.
pub const DEFAULT_BALANCE: Amount = 250_000;

/// A request to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionRequest {
    Transfer {
        amount: Amount,
        recipient: Option<String>,
        description: String,
    },
    BalanceInquiry {
        description: String,
    },
}

impl TransactionRequest {
    pub fn transfer(
        amount: Amount,
        recipient: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        TransactionRequest::Transfer {
            amount,
            recipient: Some(recipient.into()),
            description: description.into(),
        }
    }

    pub fn balance_inquiry(description: impl Into<String>) -> Self {
        TransactionRequest::BalanceInquiry {
            description: description.into(),
        }
    }

    /// Build a request from an interpreted intent. Rejected intents have no request.
    pub fn from_intent(intent: &Intent, transcript: &str) -> Option<Self> {
        match intent {
            Intent::BalanceInquiry => Some(Self::balance_inquiry(transcript)),
            Intent::Transfer { amount, recipient } => {
                Some(Self::transfer(*amount, recipient.clone(), transcript))
            }
            Intent::Rejected(_) => None,
        }
    }

    /// Build a request from a kind name as it arrives from outside the crate.
    pub fn from_parts(
        kind: &str,
        amount: Option<Amount>,
        recipient: Option<String>,
        description: impl Into<String>,
    ) -> Result<Self, RequestError> {
        match kind.parse::<TransactionKind>()? {
            TransactionKind::Transfer => Ok(TransactionRequest::Transfer {
                amount: amount.unwrap_or(0),
                recipient,
                description: description.into(),
            }),
            TransactionKind::BalanceSnapshot => Ok(Self::balance_inquiry(description)),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionRequest::Transfer { .. } => TransactionKind::Transfer,
            TransactionRequest::BalanceInquiry { .. } => TransactionKind::BalanceSnapshot,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transfer" => Ok(TransactionKind::Transfer),
            "balance" => Ok(TransactionKind::BalanceSnapshot),
            _ => Err(RequestError::UnknownRequestType(s.to_string())),
        }
    }
}

/// Why the ledger refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    MissingRecipient,
    InvalidAmount(Amount),
    InsufficientBalance { balance: Amount, required: Amount },
    UnknownRequestType(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingRecipient => write!(f, "Recipient is required for transfers"),
            RequestError::InvalidAmount(amount) => write!(f, "Invalid amount: {}", amount),
            RequestError::InsufficientBalance { balance, required } => write!(
                f,
                "Insufficient balance: available {}, required {}",
                balance, required
            ),
            RequestError::UnknownRequestType(kind) => {
                write!(f, "Unknown transaction type: {}", kind)
            }
        }
    }
}

impl std::error::Error for RequestError {}

/// Balance plus history, persisted together as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Amount,
    /// Newest first
    pub history: Vec<Transaction>,
}

impl AccountState {
    pub fn new(balance: Amount) -> Self {
        Self {
            balance,
            history: Vec::new(),
        }
    }

    /// Validate `request` and apply it in memory, returning the recorded
    /// transaction. On error the state is left untouched.
    pub fn apply(&mut self, request: &TransactionRequest) -> Result<Transaction, RequestError> {
        let transaction = match request {
            TransactionRequest::Transfer {
                amount,
                recipient,
                description,
            } => {
                let recipient = recipient
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(RequestError::MissingRecipient)?;
                if *amount <= 0 {
                    return Err(RequestError::InvalidAmount(*amount));
                }
                if *amount > self.balance {
                    return Err(RequestError::InsufficientBalance {
                        balance: self.balance,
                        required: *amount,
                    });
                }

                self.balance -= *amount;
                Transaction::transfer(*amount, recipient, description.clone())
            }
            TransactionRequest::BalanceInquiry { description } => {
                Transaction::balance_snapshot(self.balance, description.clone())
            }
        };

        self.history.insert(0, transaction.clone());
        Ok(transaction)
    }

    /// Sum of all completed transfers in the history.
    pub fn total_sent(&self) -> Amount {
        total_sent(&self.history)
    }
}

pub fn total_sent(history: &[Transaction]) -> Amount {
    history
        .iter()
        .filter(|t| t.is_transfer() && t.is_completed())
        .map(|t| t.amount)
        .sum()
}

/// Order history newest first. Stable, so equal timestamps keep their order.
pub fn sort_newest_first(history: &mut [Transaction]) {
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionStatus;

    #[test]
    fn test_transfer_debits_and_prepends() {
        let mut state = AccountState::new(DEFAULT_BALANCE);

        let txn = state
            .apply(&TransactionRequest::transfer(50000, "John", "send 50000 to john"))
            .unwrap();

        assert_eq!(state.balance, 200000);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].id, txn.id);
        assert_eq!(txn.status, TransactionStatus::Completed);
        assert_eq!(txn.recipient.as_deref(), Some("John"));
    }

    #[test]
    fn test_insufficient_balance_leaves_state() {
        let mut state = AccountState::new(10000);

        let err = state
            .apply(&TransactionRequest::transfer(50000, "Mary", "pay mary"))
            .unwrap_err();

        assert_eq!(
            err,
            RequestError::InsufficientBalance {
                balance: 10000,
                required: 50000
            }
        );
        assert_eq!(state.balance, 10000);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_transfer_of_whole_balance_is_allowed() {
        let mut state = AccountState::new(500);
        state
            .apply(&TransactionRequest::transfer(500, "Bob", "all of it"))
            .unwrap();
        assert_eq!(state.balance, 0);
    }

    #[test]
    fn test_validation_order() {
        let mut state = AccountState::new(100);

        let missing = TransactionRequest::Transfer {
            amount: -5,
            recipient: Some("   ".into()),
            description: String::new(),
        };
        assert_eq!(state.apply(&missing), Err(RequestError::MissingRecipient));

        let negative = TransactionRequest::transfer(-5, "Bob", "");
        assert_eq!(state.apply(&negative), Err(RequestError::InvalidAmount(-5)));
    }

    #[test]
    fn test_balance_inquiry_records_snapshot() {
        let mut state = AccountState::new(1234);

        let txn = state
            .apply(&TransactionRequest::balance_inquiry("check my balance"))
            .unwrap();

        assert_eq!(txn.kind, TransactionKind::BalanceSnapshot);
        assert_eq!(txn.amount, 1234);
        assert_eq!(state.balance, 1234);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_balance_invariant_holds() {
        let mut state = AccountState::new(DEFAULT_BALANCE);
        for amount in [1000, 25000, 300000, 4000] {
            let _ = state.apply(&TransactionRequest::transfer(amount, "Ann", ""));
            let _ = state.apply(&TransactionRequest::balance_inquiry(""));
        }
        assert_eq!(state.balance, DEFAULT_BALANCE - state.total_sent());
        assert_eq!(state.total_sent(), 30000);
    }

    #[test]
    fn test_request_from_intent() {
        let intent = Intent::Transfer {
            amount: 700,
            recipient: "Eve".into(),
        };
        assert_eq!(
            TransactionRequest::from_intent(&intent, "give eve 700"),
            Some(TransactionRequest::transfer(700, "Eve", "give eve 700"))
        );
        assert_eq!(
            TransactionRequest::from_intent(
                &Intent::Rejected(crate::domain::Rejection::InvalidAmount),
                "x"
            ),
            None
        );
    }

    #[test]
    fn test_request_from_unknown_kind() {
        let err = TransactionRequest::from_parts("refund", Some(5), None, "").unwrap_err();
        assert_eq!(err, RequestError::UnknownRequestType("refund".into()));

        let ok = TransactionRequest::from_parts("Balance", None, None, "cli").unwrap();
        assert_eq!(ok.kind(), TransactionKind::BalanceSnapshot);
    }
}
