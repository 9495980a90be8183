//! Command parser - Turns raw message text into a known command or fallback

use crate::application::errors::CommandError;
use crate::domain::entities::{ChainAddress, CommandKind, CommandRegistry};

/// Outcome of parsing one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Command(ParsedCommand),
    /// Not a known command; answered with the help listing
    Unrecognized,
}

/// A recognized command and its optional trailing argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub kind: CommandKind,
    pub argument: Option<String>,
}

impl ParsedCommand {
    /// The address argument, or a validation error when absent
    pub fn require_address(&self) -> Result<ChainAddress, CommandError> {
        self.argument
            .as_deref()
            .map(ChainAddress::new)
            .ok_or(CommandError::MissingArgument(self.kind.name()))
    }
}

/// Parses incoming text against the command table
pub struct CommandParser {
    registry: CommandRegistry,
}

impl CommandParser {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Parse a text message
    pub fn parse(&self, text: &str) -> ParsedMessage {
        let text = text.trim();
        let Some(cmd_text) = text.strip_prefix('/') else {
            return ParsedMessage::Unrecognized;
        };

        // Split verb and remainder at the first whitespace
        let (verb, rest) = match cmd_text.find(char::is_whitespace) {
            Some(idx) => (&cmd_text[..idx], cmd_text[idx..].trim()),
            None => (cmd_text, ""),
        };

        // Group chats address commands as /verb@botname
        let verb = verb.split('@').next().unwrap_or_default();

        match self.registry.find(verb) {
            Some(cmd) => ParsedMessage::Command(ParsedCommand {
                kind: cmd.kind,
                argument: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            None => ParsedMessage::Unrecognized,
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(CommandRegistry::new())
    }
}
