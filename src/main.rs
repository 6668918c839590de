//! CashBook main entry point

use anyhow::{bail, Context};
use cashbook_api::{start_server, AppState};
use cashbook_config::{Config, ConfigError};
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(name = "cashbook")]
#[command(author = "CashBook Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Chat-driven lending tracker with per-person balances", long_about = None)]
struct Args {
    /// Configuration file path (defaults to ./config.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Telegram bot token, overrides telegram.bot_token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn load_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path.clone())?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                Config::load(default_path)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(token) = &args.bot_token {
        config.telegram.bot_token = token.clone();
    }
    config.validate()?;
    Ok(config)
}

fn init_logger(config: &Config) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.parse_filters(&config.logging.level);
        }
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[{}] {} ({})", e.code(), e, e.severity());
            for suggestion in e.suggestions() {
                eprintln!("  - {}", suggestion);
            }
            bail!("invalid configuration");
        }
    };

    init_logger(&config);
    log::info!(
        "Config loaded: ledger={}, currency={} ({})",
        config.lendings.ledger_name,
        config.currency.symbol,
        config.currency.grouping
    );
    if config.bot_token().is_none() {
        log::warn!("Telegram bot token missing; set TELEGRAM_BOT_TOKEN to deliver replies");
    }

    let rt = Runtime::new().context("failed to start the async runtime")?;
    rt.block_on(async {
        let state = AppState::from_config(config);
        start_server(state).await
    })
    .context("server error")?;

    Ok(())
}
