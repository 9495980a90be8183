//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Chat id used for every console message
pub const CONSOLE_CHAT_ID: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "chain-tracker-bot".to_string(),
                username: "console".to_string(),
            },
        }
    }

    /// Line reader over stdin; `None` from `next_line` means EOF
    pub fn lines(&self) -> tokio::io::Lines<BufReader<Stdin>> {
        BufReader::new(tokio::io::stdin()).lines()
    }

    pub fn format_reply(text: &str) -> String {
        format!("[BOT] {}", text)
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("{}", Self::format_reply(text));
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
