//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
///
/// Every section and field is optional in YAML; anything omitted keeps its
/// default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub rpc: RpcConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "chain-tracker-bot".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub poll_timeout_seconds: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout_seconds: 30,
        }
    }
}

/// Chain RPC endpoint; the API key is appended as the last path segment
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RpcConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://rpc.testnet.rootstock.io".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay environment variables on top of the loaded values
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.telegram.token = Some(token);
        }

        if let Some(key) = lookup("RSK_API_KEY") {
            self.rpc.api_key = Some(key);
        }

        if let Some(url) = lookup("RPC_URL") {
            self.rpc.url = url;
        }

        // Hosting platforms usually hand the port over as PORT
        if let Some(port) = lookup("HTTP_PORT").or_else(|| lookup("PORT")) {
            self.http.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("port '{}'", port)))?;
        }

        Ok(())
    }

    /// Check that the required secrets are present
    pub fn validate(&self, require_token: bool) -> Result<(), ConfigError> {
        if require_token && self.telegram.token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField("telegram.token (BOT_TOKEN)".to_string()));
        }

        if self.rpc.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField("rpc.api-key (RSK_API_KEY)".to_string()));
        }

        if self.rpc.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("rpc.timeout-seconds must be positive".to_string()));
        }

        Ok(())
    }

    /// Full endpoint URL with the API key embedded
    pub fn rpc_endpoint(&self) -> Result<String, ConfigError> {
        let key = self.rpc.api_key.as_deref()
            .ok_or_else(|| ConfigError::MissingField("rpc.api-key (RSK_API_KEY)".to_string()))?;
        Ok(format!("{}/{}", self.rpc.url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_missing_secrets() {
        let config = Config::default();
        assert_eq!(config.http.port, 3000);
        assert!(matches!(config.validate(true), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("BOT_TOKEN", "123:abc"),
                ("RSK_API_KEY", "secret"),
                ("PORT", "8080"),
            ]))
            .unwrap();

        assert_eq!(config.telegram.token.as_deref(), Some("123:abc"));
        assert_eq!(config.http.port, 8080);
        assert!(config.validate(true).is_ok());
        assert_eq!(
            config.rpc_endpoint().unwrap(),
            "https://rpc.testnet.rootstock.io/secret"
        );
    }

    #[test]
    fn test_http_port_wins_over_port() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("HTTP_PORT", "9000"), ("PORT", "8080")]))
            .unwrap();
        assert_eq!(config.http.port, 9000);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_console_mode_needs_only_api_key() {
        let mut config = Config::default();
        config.rpc.api_key = Some("secret".to_string());
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
bot:
  name: tracker
telegram:
  token: "1:x"
  poll-timeout-seconds: 10
rpc:
  url: "http://localhost:8545/"
  api-key: k
  timeout-seconds: 5
http:
  enabled: false
  port: 4000
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.bot.name, "tracker");
        assert_eq!(config.telegram.poll_timeout_seconds, 10);
        assert!(!config.http.enabled);
        assert_eq!(config.rpc_endpoint().unwrap(), "http://localhost:8545/k");

        let printed = serde_yaml::to_string(&config).unwrap();
        assert!(printed.contains("poll-timeout-seconds: 10"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
rpc:
  api-key: k
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.rpc.api_key.as_deref(), Some("k"));
        assert_eq!(config.rpc.url, "https://rpc.testnet.rootstock.io");
        assert_eq!(config.rpc.timeout_seconds, 30);
        assert_eq!(config.bot.name, "chain-tracker-bot");
        assert_eq!(config.telegram.poll_timeout_seconds, 30);
        assert!(config.http.enabled);
        assert_eq!(config.http.port, 3000);
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.http.port, Config::default().http.port);
        assert!(config.telegram.token.is_none());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(Config::from_yaml("bot: ["), Err(ConfigError::Parse(_))));
    }
}
