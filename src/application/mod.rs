// Application layer - the ledger service and the voice command flow built on it.

pub mod assistant;
pub mod config;
pub mod error;
pub mod ledger;

pub use assistant::*;
pub use config::*;
pub use error::*;
pub use ledger::*;
