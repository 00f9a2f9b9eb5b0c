use std::fmt;

use super::Amount;

/// The structured meaning of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    BalanceInquiry,
    Transfer { amount: Amount, recipient: String },
    Rejected(Rejection),
}

impl Intent {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Intent::Rejected(_))
    }
}

/// Why a transcript could not be turned into an actionable intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    CommandNotRecognized,
    InvalidAmount,
    MissingRecipient,
}

impl Rejection {
    /// User-facing reason text.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::CommandNotRecognized => {
                "Command not recognized. Try \"Send 50000 to John\" or \"Check my balance\""
            }
            Rejection::InvalidAmount => "Invalid amount specified",
            Rejection::MissingRecipient => "Recipient name is required",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl std::error::Error for Rejection {}
