use std::future::Future;
use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::{
    AppConfig, CommandOutcome, Ledger, LedgerConfig, LedgerError, PaymentAssistant,
};
use crate::domain::{
    Amount, DEFAULT_BALANCE, TransactionKind, TransactionRequest, format_currency, parse_amount,
};
use crate::speech::{Capture, CaptureBackend, SpeechCapture, TranscriptSender};
use crate::storage::{KeyValueStore, MemoryStore, Repository};

/// VoicePay - voice command payments
#[derive(Parser)]
#[command(name = "voicepay")]
#[command(about = "Interpret spoken payment commands and keep a local transaction ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "voicepay.db", global = true)]
    pub database: String,

    /// Keep state in memory only (nothing is written to disk)
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Balance reported before the first transaction
    #[arg(
        long,
        default_value_t = DEFAULT_BALANCE,
        global = true,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub initial_balance: Amount,

    /// Simulated settlement delay before a transfer, in milliseconds
    #[arg(long, default_value_t = 1000, global = true)]
    pub delay_ms: u64,

    /// Speech capture backend: native (stdin transcripts) or browser (demo feed)
    #[arg(long, default_value = "native", global = true)]
    pub backend: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Interpret a spoken command and run it
    Say {
        /// The transcript, e.g. "Send 50000 to John"
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,

        /// Skip the confirmation prompt for transfers
        #[arg(short, long)]
        yes: bool,
    },

    /// Listen for transcripts from the capture backend and run each one
    Listen {
        /// Confirm every transfer without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Check whether a transcript would be understood, without running it
    Check {
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,
    },

    /// Show the current balance
    Balance,

    /// Show balance, total sent and last activity
    Summary,

    /// List recorded transactions, newest first
    History {
        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Submit a raw ledger request by kind (transfer or balance)
    Request {
        /// Request kind: transfer, balance
        kind: String,

        /// Amount to transfer (e.g. "50000" or "50,000")
        #[arg(short, long)]
        amount: Option<String>,

        /// Recipient name
        #[arg(short, long)]
        recipient: Option<String>,

        /// Description stored with the transaction
        #[arg(short = 'm', long, default_value = "Manual request")]
        description: String,
    },

    /// Show the commands the interpreter understands
    Examples,

    /// Clear balance and history
    Reset,

    /// Export the transaction history
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Install the tracing subscriber. `RUST_LOG` wins over `--verbose`.
    pub fn init_tracing(&self) -> Result<()> {
        let default_level = if self.verbose { "voicepay=debug" } else { "voicepay=warn" };
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .context("Invalid log filter")?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.verbose)
            .init();
        Ok(())
    }

    pub fn config(&self) -> Result<AppConfig> {
        let capture: CaptureBackend = self.backend.parse()?;
        Ok(AppConfig {
            database: (!self.ephemeral).then(|| self.database.clone()),
            ledger: LedgerConfig::default()
                .with_initial_balance(self.initial_balance)
                .with_settlement_delay(Duration::from_millis(self.delay_ms)),
            capture,
        })
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config()?;

        match &config.database {
            Some(path) => {
                let repo = Repository::open(path).await?;
                let ledger = Ledger::new(repo, config.ledger.clone());
                run_command(&ledger, &config, self.command).await
            }
            None => {
                let ledger = Ledger::new(MemoryStore::new(), config.ledger.clone());
                run_command(&ledger, &config, self.command).await
            }
        }
    }
}

async fn run_command<S: KeyValueStore>(
    ledger: &Ledger<S>,
    config: &AppConfig,
    command: Commands,
) -> Result<()> {
    let assistant = PaymentAssistant::new(ledger);

    match command {
        // opening the store already ran the migration
        Commands::Init => match &config.database {
            Some(path) => println!("Database initialized: {}", path),
            None => println!("Nothing to initialize for an in-memory ledger."),
        },

        Commands::Say { transcript, yes } => {
            let transcript = transcript.join(" ");
            run_transcript(&assistant, &transcript, move |prompt| async move {
                if yes { Ok(true) } else { confirm(&prompt).await }
            })
            .await?;
        }

        Commands::Listen { yes } => {
            run_listen_command(&assistant, config.capture, yes).await?;
        }

        Commands::Check { transcript } => {
            let transcript = transcript.join(" ");
            if assistant.interpreter().can_interpret(&transcript) {
                println!("Understood: {}", transcript);
            } else {
                println!("Not understood: {}", transcript);
                println!("Try one of:");
                for example in assistant.interpreter().example_commands() {
                    println!("  {}", example);
                }
            }
        }

        Commands::Balance => {
            println!("Balance: {}", format_currency(ledger.balance().await));
        }

        Commands::Summary => {
            let summary = ledger.summary().await;
            println!("Balance:        {}", format_currency(summary.balance));
            println!("Total sent:     {}", format_currency(summary.total_sent));
            println!("Transfers:      {}", summary.transfer_count);
            if let Some(last) = summary.last_activity {
                println!("Last activity:  {}", last.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::History { limit } => {
            run_history_command(ledger, limit).await;
        }

        Commands::Request {
            kind,
            amount,
            recipient,
            description,
        } => {
            let amount = amount
                .map(|a| parse_amount(&a))
                .transpose()
                .context("Invalid amount format. Use '50000' or '50,000'")?;
            let request = TransactionRequest::from_parts(&kind, amount, recipient, description)
                .map_err(LedgerError::from)?;

            let txn = ledger.apply(request).await?;
            match txn.kind {
                TransactionKind::Transfer => println!(
                    "Sent {} to {} ({})",
                    format_currency(txn.amount),
                    txn.recipient.as_deref().unwrap_or_default(),
                    txn.id
                ),
                TransactionKind::BalanceSnapshot => println!(
                    "Recorded balance {} ({})",
                    format_currency(txn.amount),
                    txn.id
                ),
            }
        }

        Commands::Examples => {
            for example in assistant.interpreter().example_commands() {
                println!("{}", example);
            }
        }

        Commands::Reset => {
            ledger.reset_account().await?;
            println!(
                "Account reset. Balance is back to {}.",
                format_currency(ledger.balance().await)
            );
        }

        Commands::Export { format, output } => {
            run_export_command(ledger, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}

/// Interpret one transcript and run it, asking `confirm` before transfers.
/// Rejections and ledger refusals are reported, not returned as errors.
async fn run_transcript<S, F, Fut>(
    assistant: &PaymentAssistant<'_, S>,
    transcript: &str,
    confirm: F,
) -> Result<()>
where
    S: KeyValueStore,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let command = match assistant.prepare(transcript) {
        Ok(command) => command,
        Err(reason) => {
            println!("Error: {}", reason);
            return Ok(());
        }
    };

    let confirmed = match command.confirmation_prompt() {
        Some(prompt) => confirm(prompt).await?,
        None => true,
    };

    match assistant.execute(command, confirmed).await {
        Ok(CommandOutcome::Balance { balance, .. }) => {
            println!("Your current balance is {}", format_currency(balance));
        }
        Ok(CommandOutcome::Transferred(txn)) => {
            println!(
                "Transaction completed: {} to {} ({})",
                format_currency(txn.amount),
                txn.recipient.as_deref().unwrap_or_default(),
                txn.id
            );
        }
        Ok(CommandOutcome::Declined) => println!("Cancelled."),
        Err(e) if e.is_rejection() => println!("Error: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn run_listen_command<S: KeyValueStore>(
    assistant: &PaymentAssistant<'_, S>,
    backend: CaptureBackend,
    yes: bool,
) -> Result<()> {
    let (mut capture, sender) = Capture::from_backend(backend);
    if !capture.is_available() {
        anyhow::bail!("Speech capture backend '{}' is not available", backend);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    capture
        .start_listening(move |transcript| {
            let _ = tx.send(transcript);
        })
        .await?;
    info!(%backend, "Listening for commands");

    if let Some(sender) = sender {
        feed_examples(assistant, sender)?;
    }

    while let Some(transcript) = rx.recv().await {
        println!("> {}", transcript);
        run_transcript(assistant, &transcript, move |prompt| async move {
            if yes {
                Ok(true)
            } else if backend == CaptureBackend::Native {
                // stdin carries the transcripts, so there is nobody to ask
                println!("{} (skipped: pass --yes to confirm while listening)", prompt);
                Ok(false)
            } else {
                confirm(&prompt).await
            }
        })
        .await?;
    }

    capture.stop_listening().await;
    Ok(())
}

/// Without a host page, the browser backend replays the sample commands.
fn feed_examples<S: KeyValueStore>(
    assistant: &PaymentAssistant<'_, S>,
    sender: TranscriptSender,
) -> Result<()> {
    for example in assistant.interpreter().example_commands() {
        sender.push(*example)?;
    }
    Ok(())
}

async fn run_history_command<S: KeyValueStore>(ledger: &Ledger<S>, limit: Option<usize>) {
    let transactions = ledger.transactions().await;

    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<17} {:<9} {:>14} {:<18} {:<10} DESCRIPTION",
        "DATE", "TYPE", "AMOUNT", "RECIPIENT", "STATUS"
    );
    println!("{}", "-".repeat(90));

    for txn in transactions.iter().take(limit.unwrap_or(usize::MAX)) {
        let sign = if txn.is_transfer() { "-" } else { "" };
        println!(
            "{:<17} {:<9} {:>14} {:<18} {:<10} {}",
            txn.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            txn.kind.as_str(),
            format!("{}{}", sign, format_currency(txn.amount)),
            truncate(txn.recipient.as_deref().unwrap_or(""), 18),
            txn.status.as_str(),
            truncate(&txn.description, 30)
        );
    }
}

async fn run_export_command<S: KeyValueStore>(
    ledger: &Ledger<S>,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::stdout;

    let exporter = Exporter::new(ledger);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => exporter.export_transactions_csv(writer).await?,
        "json" => exporter.export_json(writer).await?,
        _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format),
    };

    if output.is_some() {
        eprintln!("Exported {} transactions", count);
    }
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" declines.
async fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let answer = tokio::task::spawn_blocking(|| {
        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer).map(|_| answer)
    })
    .await
    .context("Confirmation prompt was interrupted")?
    .context("Failed to read confirmation")?;

    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("John", 18), "John");
        assert_eq!(truncate("send 50000 to john", 10), "send 50...");
    }

    #[test]
    fn test_parse_say_command() {
        let cli = Cli::try_parse_from(["voicepay", "--ephemeral", "say", "send", "500", "to", "bob"])
            .unwrap();
        match &cli.command {
            Commands::Say { transcript, yes } => {
                assert_eq!(transcript.join(" "), "send 500 to bob");
                assert!(!yes);
            }
            _ => panic!("expected say"),
        }
        let config = cli.config().unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::try_parse_from([
            "voicepay",
            "--initial-balance",
            "10000",
            "--delay-ms",
            "0",
            "--backend",
            "browser",
            "balance",
        ])
        .unwrap();
        let config = cli.config().unwrap();

        assert_eq!(config.database.as_deref(), Some("voicepay.db"));
        assert_eq!(config.ledger.initial_balance, 10000);
        assert!(config.ledger.settlement_delay.is_zero());
        assert_eq!(config.capture, CaptureBackend::Browser);
    }

    #[test]
    fn test_negative_initial_balance_is_rejected() {
        assert!(Cli::try_parse_from(["voicepay", "--initial-balance", "-1", "balance"]).is_err());
        let cli = Cli::try_parse_from(["voicepay", "--initial-balance", "0", "balance"]).unwrap();
        assert_eq!(cli.initial_balance, 0);
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("nope"));
    }

    #[tokio::test]
    async fn test_init_on_memory_store() -> Result<()> {
        let cli = Cli::try_parse_from(["voicepay", "--ephemeral", "init"])?;
        cli.run().await
    }

    #[tokio::test]
    async fn test_say_with_yes_applies_transfer() -> Result<()> {
        let ledger = Ledger::new(MemoryStore::new(), LedgerConfig::immediate());
        let assistant = PaymentAssistant::new(&ledger);

        run_transcript(&assistant, "send 1,000 to ann", |_| async { Ok(true) }).await?;
        run_transcript(&assistant, "send 1,0000 to ann", |_| async { Ok(true) }).await?;

        assert_eq!(ledger.balance().await, DEFAULT_BALANCE - 1000);
        assert_eq!(ledger.transactions().await.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let cli = Cli::try_parse_from(["voicepay", "--backend", "alexa", "balance"]).unwrap();
        assert!(cli.config().is_err());
    }
}
