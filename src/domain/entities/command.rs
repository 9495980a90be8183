/// The fixed set of commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Balance,
    Transactions,
    LatestBlock,
    Help,
    GasPrice,
}

impl CommandKind {
    /// Declared order; drives the help listing and Telegram registration
    pub const ALL: [CommandKind; 6] = [
        CommandKind::Start,
        CommandKind::Balance,
        CommandKind::Transactions,
        CommandKind::LatestBlock,
        CommandKind::Help,
        CommandKind::GasPrice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Balance => "balance",
            CommandKind::Transactions => "transactions",
            CommandKind::LatestBlock => "latestblock",
            CommandKind::Help => "help",
            CommandKind::GasPrice => "gasprice",
        }
    }

    /// Whether the command needs an address argument
    pub fn takes_address(&self) -> bool {
        matches!(self, CommandKind::Balance | CommandKind::Transactions)
    }
}

/// Represents a bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub name: &'static str,
    pub description: &'static str,
    pub usage: String,
}

impl Command {
    pub fn new(kind: CommandKind, description: &'static str) -> Self {
        let name = kind.name();
        let usage = if kind.takes_address() {
            format!("/{} <address> - {}", name, description)
        } else {
            format!("/{} - {}", name, description)
        };
        Self {
            kind,
            name,
            description,
            usage,
        }
    }

    pub fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input)
    }
}

/// Command registry; fixed at startup, iterated in declared order
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let commands = CommandKind::ALL
            .iter()
            .map(|kind| {
                let description = match kind {
                    CommandKind::Start => "Start the bot",
                    CommandKind::Balance => "Check the balance of a wallet",
                    CommandKind::Transactions => "Get recent transactions of a wallet",
                    CommandKind::LatestBlock => "Get the latest block number",
                    CommandKind::Help => "Show this help message",
                    CommandKind::GasPrice => "Get the current gas price",
                };
                Command::new(*kind, description)
            })
            .collect();

        Self { commands }
    }

    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.matches(input))
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Help listing shared by `/help` and the unrecognized-command fallback
    pub fn help_text(&self) -> String {
        let lines: Vec<&str> = self.commands.iter().map(|c| c.usage.as_str()).collect();
        format!("You can use the following commands:\n{}", lines.join("\n"))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
