//! Command router - Dispatches parsed commands and sends exactly one reply

use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::{ChainAddress, CommandKind, IncomingMessage};
use crate::domain::traits::{Bot, ChainReader};
use crate::domain::units::format_ether;
use super::parser::{CommandParser, ParsedCommand, ParsedMessage};

pub const WELCOME_TEXT: &str = "Hello! Welcome to the Transaction-TrackerBOT.";
pub const MISSING_ADDRESS_TEXT: &str = "Please provide a valid address.";
pub const BALANCE_FAILED_TEXT: &str = "Failed to fetch the balance. Please try again later.";
pub const GAS_PRICE_FAILED_TEXT: &str = "Failed to fetch gas price. Please try again later.";
pub const LATEST_BLOCK_FAILED_TEXT: &str =
    "Failed to fetch the latest block number. Please try again later.";

pub fn transactions_failed_text(address: &ChainAddress) -> String {
    format!("Failed to fetch transactions for {}. Please try again later.", address)
}

/// Routes inbound messages to command handlers.
///
/// Every call to [`CommandRouter::handle`] produces exactly one reply. RPC
/// failures are logged and turned into a fixed reply; nothing propagates.
pub struct CommandRouter<B: Bot, C: ChainReader> {
    bot: Arc<B>,
    chain: Arc<C>,
    parser: CommandParser,
}

impl<B: Bot, C: ChainReader> CommandRouter<B, C> {
    pub fn new(bot: Arc<B>, chain: Arc<C>, parser: CommandParser) -> Self {
        Self { bot, chain, parser }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Handle one message and send its reply
    pub async fn handle(&self, message: &IncomingMessage) {
        let reply = self.reply_for(message).await;
        self.notify(&message.chat_id, &reply).await;
    }

    /// Compute the reply text for a message without sending it
    pub async fn reply_for(&self, message: &IncomingMessage) -> String {
        match self.parser.parse(&message.text) {
            ParsedMessage::Command(cmd) => {
                tracing::debug!("[{}] /{} {:?}", message.chat_id, cmd.kind.name(), cmd.argument);
                self.dispatch(&message.chat_id, &cmd).await
            }
            ParsedMessage::Unrecognized => {
                tracing::debug!("[{}] Unrecognized command, sending help", message.chat_id);
                self.help_text()
            }
        }
    }

    pub fn help_text(&self) -> String {
        self.parser.registry().help_text()
    }

    async fn dispatch(&self, chat_id: &str, cmd: &ParsedCommand) -> String {
        match cmd.kind {
            CommandKind::Start => WELCOME_TEXT.to_string(),
            CommandKind::Help => self.help_text(),
            CommandKind::Balance => match cmd.require_address() {
                Ok(address) => self.balance(chat_id, &address).await,
                Err(_) => MISSING_ADDRESS_TEXT.to_string(),
            },
            CommandKind::Transactions => match cmd.require_address() {
                Ok(address) => self.transactions(chat_id, &address).await,
                Err(_) => MISSING_ADDRESS_TEXT.to_string(),
            },
            CommandKind::GasPrice => self.gas_price(chat_id).await,
            CommandKind::LatestBlock => self.latest_block(chat_id).await,
        }
    }

    async fn balance(&self, chat_id: &str, address: &ChainAddress) -> String {
        let ether = match self.chain.get_balance(address).await {
            Ok(wei) => format_ether(wei).map_err(BotError::from),
            Err(e) => Err(BotError::from(e)),
        };

        match ether {
            Ok(ether) => format!("The balance of the address {} is {} ETH.", address, ether),
            Err(e) => {
                tracing::error!("[{}] Failed to fetch balance for {}: {}", chat_id, address, e);
                BALANCE_FAILED_TEXT.to_string()
            }
        }
    }

    async fn gas_price(&self, chat_id: &str) -> String {
        let ether = match self.chain.get_gas_price().await {
            Ok(wei) => format_ether(wei).map_err(BotError::from),
            Err(e) => Err(BotError::from(e)),
        };

        match ether {
            // Unit is lowercase here, unlike the balance reply
            Ok(ether) => format!("The current gas price is {} eth.", ether),
            Err(e) => {
                tracing::error!("[{}] Failed to fetch gas price: {}", chat_id, e);
                GAS_PRICE_FAILED_TEXT.to_string()
            }
        }
    }

    async fn transactions(&self, chat_id: &str, address: &ChainAddress) -> String {
        match self.chain.get_transaction_count(address).await {
            Ok(count) => format!("{} has made {} transactions.", address, count),
            Err(e) => {
                tracing::error!("[{}] Failed to fetch transactions for {}: {}", chat_id, address, e);
                transactions_failed_text(address)
            }
        }
    }

    async fn latest_block(&self, chat_id: &str) -> String {
        match self.chain.get_block_number().await {
            Ok(height) => format!("The latest block number is {}.", height),
            Err(e) => {
                tracing::error!("[{}] Failed to fetch latest block number: {}", chat_id, e);
                LATEST_BLOCK_FAILED_TEXT.to_string()
            }
        }
    }

    /// Best-effort delivery; a failed send is logged and dropped
    async fn notify(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.bot.send_message(chat_id, text).await {
            tracing::warn!("[{}] Failed to send reply: {}", chat_id, e);
        }
    }
}
