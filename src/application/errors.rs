//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Units error: {0}")]
    Units(#[from] UnitsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chain RPC errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Command argument errors, answered directly to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Missing argument for /{0}")]
    MissingArgument(&'static str),
}

/// Unit conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amount {value} has more than {decimals} decimal places")]
    TooPrecise { decimals: u8, value: String },

    #[error("Amount out of range: {0}")]
    Overflow(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
