pub mod export;

pub use export::{AccountSnapshot, Exporter};
