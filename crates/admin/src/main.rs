//! pb-admin CLI - superuser session client

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use pb_admin::{AdminConfig, ApiClient, HistoryNavigator, LOGIN_ROUTE, logging};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pb-admin")]
#[command(about = "Superuser session client for PocketBase-style admin backends")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to pb-admin.toml or config/pb-admin.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides PB_BACKEND_URL and the config file
    #[arg(short = 'u', long, global = true)]
    backend_url: Option<String>,

    /// Set logging level
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AdminConfig::load(cli.config.as_deref())?;
    if let Some(backend_url) = cli.backend_url {
        config.backend_url = backend_url;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    logging::init_logging(&config.log_level, config.log_json)?;

    let navigator = Arc::new(HistoryNavigator::new());
    let api = ApiClient::from_config(&config, navigator.clone())?;

    let result = cli.command.execute(&api).await;

    if navigator.location() == LOGIN_ROUTE {
        info!("Session ended, run `pb-admin login` to sign in again");
    }

    if let Err(e) = result {
        error!("Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
