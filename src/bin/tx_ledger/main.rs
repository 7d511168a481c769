//! Transaction ledger tool for the Clober front end.
//!
//! This binary inspects and mutates the file-backed pending transaction
//! ledger of a wallet, and can follow an indexer to reconcile it.

mod app;
mod config;
mod error;

use std::{
    process::exit,
    time::{SystemTime, UNIX_EPOCH},
};

use clap::Parser;
use clober_core::ledger::{FileStorage, TransactionLedger};
use tracing::error;

use app::LedgerApp;
use config::{CliConfig, EnvConfig};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

async fn run(env_config: EnvConfig, cli_config: CliConfig) -> error::Result<()> {
    let chain = env_config.chain();
    let command = cli_config.command.to_command(&chain, now_ms())?;
    let wallet_address = env_config.wallet_address()?;

    let storage = FileStorage::open(env_config.ledger_dir())?;
    let mut ledger = TransactionLedger::new(storage, chain);
    ledger.select_account(Some(wallet_address))?;

    let mut app = LedgerApp::new(
        ledger,
        env_config.indexer_url()?,
        env_config.poll_interval(),
    );
    app.run(command).await
}

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(env_config, cli_config).await {
        error!(%e, "Transaction ledger command failed");
        exit(1);
    }
}
