use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chain_tracker_bot::application::errors::{BotError, ConfigError};
use chain_tracker_bot::application::messaging::{CommandParser, CommandRouter};
use chain_tracker_bot::domain::entities::IncomingMessage;
use chain_tracker_bot::domain::traits::Bot;
use chain_tracker_bot::infrastructure::adapters::console::CONSOLE_CHAT_ID;
use chain_tracker_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use chain_tracker_bot::infrastructure::config::Config;
use chain_tracker_bot::infrastructure::http;
use chain_tracker_bot::infrastructure::rpc::RpcClient;

/// Pause before polling again after a failed getUpdates
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "chain-tracker-bot")]
#[command(about = "Telegram bot for reading balances, gas price and blocks from a chain RPC", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and BOT_TOKEN)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Telegram bot
    Run,
    /// Answer commands typed on stdin (dev mode)
    Console,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run(&cli.config, cli.token, true),
        Commands::Console => run(&cli.config, cli.token, false),
        Commands::Version => {
            println!("chain-tracker-bot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(),
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, ConfigError> {
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        tracing::debug!("No config file at {}, using defaults", config_path);
        Config::default()
    };

    config.apply_env()?;

    if let Some(token) = token_override {
        config.telegram.token = Some(token);
    }

    Ok(config)
}

fn run(config_path: &str, token_override: Option<String>, telegram: bool) -> ExitCode {
    let config = match load_config(config_path, token_override)
        .and_then(|config| config.validate(telegram).map(|_| config))
    {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Starting {}", config.bot.name);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = rt.block_on(async {
        if telegram {
            run_telegram_bot(config).await
        } else {
            run_console_bot(config).await
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Bot stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn rpc_client(config: &Config) -> Result<Arc<RpcClient>, BotError> {
    let endpoint = config.rpc_endpoint()?;
    let client = RpcClient::new(endpoint, Duration::from_secs(config.rpc.timeout_seconds))?;
    tracing::info!("Using chain RPC at {}", config.rpc.url);
    Ok(Arc::new(client))
}

fn spawn_http_listener(port: u16) {
    tokio::spawn(async move {
        if let Err(e) = http::serve(port).await {
            tracing::error!("HTTP listener stopped: {}", e);
        }
    });
}

async fn run_telegram_bot(config: Config) -> Result<(), BotError> {
    let token = config.telegram.token.clone()
        .ok_or_else(|| ConfigError::MissingField("telegram.token (BOT_TOKEN)".to_string()))?;
    let poll_timeout = config.telegram.poll_timeout_seconds;

    let chain = rpc_client(&config)?;
    let mut bot = TelegramAdapter::new(token, poll_timeout)?;

    // Fetch bot info
    bot.fetch_bot_info().await?;
    tracing::info!("Bot started: @{}", bot.bot_info().username);

    let parser = CommandParser::default();

    // Register bot commands with Telegram
    if let Err(e) = bot.register_commands(parser.registry()).await {
        tracing::warn!("Failed to register commands: {}", e);
    }

    bot.start().await?;

    if config.http.enabled {
        spawn_http_listener(config.http.port);
    }

    let bot = Arc::new(bot);
    let router = Arc::new(CommandRouter::new(bot.clone(), chain, parser));

    let mut offset: i64 = 0;

    tracing::info!("Starting message loop...");

    loop {
        match bot.get_updates(offset, poll_timeout).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::info!("Received {} updates", updates.len());
                }

                for update in &updates {
                    let Some(message) = update.incoming() else {
                        continue;
                    };

                    // Each message runs independently of the poll loop
                    let router = router.clone();
                    tokio::spawn(async move {
                        router.handle(&message).await;
                    });
                }

                offset = TelegramAdapter::get_next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

async fn run_console_bot(config: Config) -> Result<(), BotError> {
    let chain = rpc_client(&config)?;
    let bot = Arc::new(ConsoleAdapter::new());
    bot.start().await?;

    let router = CommandRouter::new(bot.clone(), chain, CommandParser::default());
    let mut lines = bot.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        router.handle(&IncomingMessage::new(CONSOLE_CHAT_ID, line)).await;
    }

    tracing::info!("Console closed");
    Ok(())
}

fn init_config() -> ExitCode {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to render config: {}", e);
            ExitCode::FAILURE
        }
    }
}
