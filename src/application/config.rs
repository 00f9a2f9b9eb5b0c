use std::time::Duration;

use crate::domain::{Amount, DEFAULT_BALANCE};
use crate::speech::CaptureBackend;

/// Settlement latency simulated before a transfer is applied.
pub const DEFAULT_SETTLEMENT_DELAY: Duration = Duration::from_millis(1000);

/// Ledger tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Balance reported while nothing has been persisted yet
    pub initial_balance: Amount,
    /// Pause inserted before every transfer
    pub settlement_delay: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_BALANCE,
            settlement_delay: DEFAULT_SETTLEMENT_DELAY,
        }
    }
}

impl LedgerConfig {
    /// No settlement delay. Handy for tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            settlement_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_initial_balance(mut self, balance: Amount) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn with_settlement_delay(mut self, delay: Duration) -> Self {
        self.settlement_delay = delay;
        self
    }
}

/// Everything the front-end needs to wire up a session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file path; `None` keeps state in memory
    pub database: Option<String>,
    pub ledger: LedgerConfig,
    pub capture: CaptureBackend,
}
