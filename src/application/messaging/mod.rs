//! Message handling - Command parsing and routing

pub mod parser;
pub mod router;

pub use parser::{CommandParser, ParsedCommand, ParsedMessage};
pub use router::CommandRouter;
