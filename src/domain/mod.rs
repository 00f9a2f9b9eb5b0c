mod account;
mod intent;
pub mod interpreter;
mod money;
mod transaction;

pub use account::*;
pub use intent::*;
pub use interpreter::CommandInterpreter;
pub use money::*;
pub use transaction::*;
