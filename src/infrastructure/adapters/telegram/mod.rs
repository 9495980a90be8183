//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entities::{CommandRegistry, IncomingMessage};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Headroom on top of the long-poll timeout for the HTTP client
const POLL_GRACE_SECONDS: u64 = 10;

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

impl Update {
    /// The routable part of the update, if it carries a chat message
    pub fn incoming(&self) -> Option<IncomingMessage> {
        self.message.as_ref().map(|msg| {
            IncomingMessage::new(msg.chat.id.to_string(), msg.text.clone().unwrap_or_default())
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T, BotError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Api(format!(
                "{}: {}",
                method,
                self.description.unwrap_or_else(|| "no result".to_string())
            ))),
        }
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    api_base: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, poll_timeout_seconds: u64) -> Result<Self, BotError> {
        Self::with_api_base(token, API_BASE, poll_timeout_seconds)
    }

    pub fn with_api_base(
        token: impl Into<String>,
        api_base: impl Into<String>,
        poll_timeout_seconds: u64,
    ) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_seconds.saturating_add(POLL_GRACE_SECONDS)))
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            token: token.into(),
            api_base: api_base.into(),
            client,
            info: BotInfo {
                id: "unknown".to_string(),
                name: "chain-tracker-bot".to_string(),
                username: "chain_tracker_bot".to_string(),
            },
        })
    }

    /// First characters of the token, safe to log
    fn token_preview(&self) -> String {
        self.token.chars().take(8).collect()
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn post<Req, Res>(&self, method: &str, request: &Req) -> Result<Res, BotError>
    where
        Req: Serialize + ?Sized,
        Res: for<'de> Deserialize<'de>,
    {
        let response = self.client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        let data: ApiResponse<Res> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("{} (status {})", e, status)))?;

        data.into_result(method)
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let data: BotInfoResponse = self.post("getMe", &serde_json::json!({})).await?;

        self.info = BotInfo {
            id: data.id.to_string(),
            name: data.first_name,
            username: data.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        self.post("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
    }

    /// Send a plain-text message via Telegram API
    pub async fn send_message_api(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let request = SendMessageRequest { chat_id, text };
        let data: MessageResult = self.post("sendMessage", &request).await?;

        Ok(data.message_id.to_string())
    }

    /// Register bot commands with Telegram
    pub async fn register_commands(&self, registry: &CommandRegistry) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command<'a> {
            command: &'a str,
            description: &'a str,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest<'a> {
            commands: Vec<Command<'a>>,
        }

        let commands = registry
            .all()
            .map(|c| Command {
                command: c.name,
                description: c.description,
            })
            .collect();

        let _: bool = self
            .post("setMyCommands", &SetMyCommandsRequest { commands })
            .await?;

        tracing::info!("Registered {} bot commands with Telegram", registry.len());
        Ok(())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting Telegram bot (token: {}...)", self.token_preview());
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);
        self.send_message_api(chat_id, text).await
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
