use thiserror::Error;

use crate::domain::{Amount, RequestError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Recipient is required for transfers")]
    MissingRecipient,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("Insufficient balance: available {balance}, required {required}")]
    InsufficientBalance { balance: Amount, required: Amount },

    #[error("Unknown transaction type: {0}")]
    UnknownRequestType(String),

    #[error("Request cancelled before it was applied")]
    Cancelled,

    #[error("Failed to read account state: {0}")]
    StorageRead(#[source] anyhow::Error),

    #[error("Failed to persist account state: {0}")]
    StorageWrite(#[source] anyhow::Error),
}

impl From<RequestError> for LedgerError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::MissingRecipient => LedgerError::MissingRecipient,
            RequestError::InvalidAmount(amount) => LedgerError::InvalidAmount(amount),
            RequestError::InsufficientBalance { balance, required } => {
                LedgerError::InsufficientBalance { balance, required }
            }
            RequestError::UnknownRequestType(kind) => LedgerError::UnknownRequestType(kind),
        }
    }
}

impl LedgerError {
    /// Validation failures the user can fix by rephrasing; storage and
    /// cancellation are not in this group.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::MissingRecipient
                | LedgerError::InvalidAmount(_)
                | LedgerError::InsufficientBalance { .. }
                | LedgerError::UnknownRequestType(_)
        )
    }
}
