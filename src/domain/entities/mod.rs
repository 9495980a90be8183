//! Domain entities - Core business objects with no external dependencies

pub mod message;
pub mod command;

pub use message::{ChainAddress, IncomingMessage};
pub use command::{Command, CommandKind, CommandRegistry};
