pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod speech;
pub mod storage;

pub use application::{Ledger, PaymentAssistant};
pub use domain::*;
pub use storage::{KeyValueStore, MemoryStore, Repository};
