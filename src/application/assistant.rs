use tracing::debug;

use crate::domain::{
    Amount, CommandInterpreter, Intent, Rejection, Transaction, TransactionRequest,
    format_currency,
};
use crate::storage::KeyValueStore;

use super::{Ledger, LedgerError};

/// A transcript that has been interpreted and is ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub transcript: String,
    pub intent: Intent,
    pub request: TransactionRequest,
}

impl PreparedCommand {
    /// Transfers move money and must be confirmed by the user first.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self.intent, Intent::Transfer { .. })
    }

    /// Question to put to the user before running a transfer.
    pub fn confirmation_prompt(&self) -> Option<String> {
        match &self.intent {
            Intent::Transfer { amount, recipient } => {
                Some(format!("Send {} to {}?", format_currency(*amount), recipient))
            }
            _ => None,
        }
    }
}

/// What happened to a command after it reached the ledger.
#[derive(Debug)]
pub enum CommandOutcome {
    Balance {
        balance: Amount,
        transaction: Transaction,
    },
    Transferred(Transaction),
    /// The user declined the confirmation; nothing was applied.
    Declined,
}

/// Drives transcript → intent → confirmation → ledger.
pub struct PaymentAssistant<'a, S> {
    ledger: &'a Ledger<S>,
    interpreter: CommandInterpreter,
}

impl<'a, S: KeyValueStore> PaymentAssistant<'a, S> {
    pub fn new(ledger: &'a Ledger<S>) -> Self {
        Self {
            ledger,
            interpreter: CommandInterpreter::new(),
        }
    }

    pub fn interpreter(&self) -> &CommandInterpreter {
        &self.interpreter
    }

    /// Interpret a transcript. Blank transcripts are not recognized.
    pub fn prepare(&self, transcript: &str) -> Result<PreparedCommand, Rejection> {
        let intent = self.interpreter.interpret(transcript);
        debug!(transcript, ?intent, "Interpreted transcript");

        if let Intent::Rejected(reason) = intent {
            return Err(reason);
        }
        let request = TransactionRequest::from_intent(&intent, transcript.trim())
            .ok_or(Rejection::CommandNotRecognized)?;

        Ok(PreparedCommand {
            transcript: transcript.trim().to_string(),
            intent,
            request,
        })
    }

    /// Run a prepared command. `confirmed` is ignored for commands that do not
    /// need confirmation.
    pub async fn execute(
        &self,
        command: PreparedCommand,
        confirmed: bool,
    ) -> Result<CommandOutcome, LedgerError> {
        if command.needs_confirmation() && !confirmed {
            debug!(transcript = %command.transcript, "Command declined");
            return Ok(CommandOutcome::Declined);
        }

        let transaction = self.ledger.apply(command.request).await?;
        Ok(match command.intent {
            Intent::BalanceInquiry => CommandOutcome::Balance {
                balance: transaction.amount,
                transaction,
            },
            _ => CommandOutcome::Transferred(transaction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::LedgerConfig;
    use crate::domain::DEFAULT_BALANCE;
    use crate::storage::MemoryStore;

    fn ledger() -> Ledger<MemoryStore> {
        Ledger::new(MemoryStore::new(), LedgerConfig::immediate())
    }

    #[test]
    fn test_prepare_transfer_needs_confirmation() {
        let ledger = ledger();
        let assistant = PaymentAssistant::new(&ledger);

        let command = assistant.prepare("Send 50000 to John").unwrap();

        assert!(command.needs_confirmation());
        assert_eq!(
            command.confirmation_prompt().as_deref(),
            Some("Send UGX 50,000 to John?")
        );
        assert_eq!(
            command.request,
            TransactionRequest::transfer(50000, "John", "Send 50000 to John")
        );
    }

    #[test]
    fn test_prepare_rejection() {
        let ledger = ledger();
        let assistant = PaymentAssistant::new(&ledger);

        assert_eq!(
            assistant.prepare("banana"),
            Err(Rejection::CommandNotRecognized)
        );
        assert_eq!(
            assistant.prepare("give bob 0"),
            Err(Rejection::InvalidAmount)
        );
    }

    #[tokio::test]
    async fn test_declined_transfer_applies_nothing() -> Result<(), LedgerError> {
        let ledger = ledger();
        let assistant = PaymentAssistant::new(&ledger);

        let command = assistant.prepare("pay mary 100").unwrap();
        let outcome = assistant.execute(command, false).await?;

        assert!(matches!(outcome, CommandOutcome::Declined));
        assert_eq!(ledger.balance().await, DEFAULT_BALANCE);
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_inquiry_runs_without_confirmation() -> Result<(), LedgerError> {
        let ledger = ledger();
        let assistant = PaymentAssistant::new(&ledger);

        let command = assistant.prepare("check my balance").unwrap();
        assert!(!command.needs_confirmation());

        match assistant.execute(command, false).await? {
            CommandOutcome::Balance { balance, .. } => assert_eq!(balance, DEFAULT_BALANCE),
            other => panic!("unexpected outcome: {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_confirmed_transfer_is_applied() -> Result<(), LedgerError> {
        let ledger = ledger();
        let assistant = PaymentAssistant::new(&ledger);

        let command = assistant.prepare("transfer 1,000 to mary jane").unwrap();
        match assistant.execute(command, true).await? {
            CommandOutcome::Transferred(txn) => {
                assert_eq!(txn.amount, 1000);
                assert_eq!(txn.recipient.as_deref(), Some("Mary Jane"));
                assert_eq!(txn.description, "transfer 1,000 to mary jane");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(ledger.balance().await, DEFAULT_BALANCE - 1000);
        Ok(())
    }
}
