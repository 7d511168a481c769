//! Configuration for the transaction ledger tool.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): wallet, storage, indexer
//! - CLI arguments: the ledger command to run

use std::{path::PathBuf, str::FromStr, time::Duration};

use alloy_primitives::{Address, TxHash, hex::FromHexError};
use clap::{Parser, Subcommand};
use clober_core::{
    Chain,
    ledger::{Receipt, Transaction, TransactionKind},
};
use url::Url;

const DEFAULT_LEDGER_DIR: &str = ".clober/transactions";
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 2;

/// Environment configuration.
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Wallet whose transactions are tracked
    pub wallet_address: String,

    /// Chain ID (e.g., 8453 for Base)
    pub chain_id: u64,

    /// Directory holding the persisted lists
    pub ledger_dir: Option<PathBuf>,

    /// Subgraph endpoint reporting the last indexed block
    pub indexer_url: Option<String>,

    /// Indexer poll interval (default: 2s)
    pub poll_interval_seconds: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn wallet_address(&self) -> Result<Address, FromHexError> {
        self.wallet_address.parse()
    }

    pub fn chain(&self) -> Chain {
        Chain::from_id(self.chain_id)
    }

    pub fn ledger_dir(&self) -> PathBuf {
        self.ledger_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_DIR))
    }

    pub fn indexer_url(&self) -> Result<Option<Url>, url::ParseError> {
        self.indexer_url.as_deref().map(Url::parse).transpose()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_seconds
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
        )
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "tx-ledger")]
#[command(about = "Inspect and reconcile the pending transaction ledger of a wallet")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print pending transactions and history
    List,

    /// Queue a freshly signed transaction
    Queue {
        tx_hash: String,

        /// Transaction kind (e.g., swap, limit, cancel, vault-deposit)
        #[arg(long, default_value = "swap")]
        kind: String,

        #[arg(long, default_value = "")]
        title: String,
    },

    /// Record the mined receipt of a pending transaction
    Confirm {
        tx_hash: String,

        block_number: u64,

        /// Receipt reported a revert
        #[arg(long)]
        failed: bool,
    },

    /// Reconcile against an explicit indexer height
    Reconcile { last_indexed_block: u64 },

    /// Poll the indexer and reconcile on every new height
    Watch {
        /// Exit once nothing is pending
        #[arg(long)]
        until_empty: bool,
    },

    /// Drop the history of the configured chain
    ClearHistory,
}

/// Validated ledger command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Queue(Transaction),
    Confirm(Receipt),
    Reconcile(u64),
    Watch { until_empty: bool },
    ClearHistory,
}

impl CliCommand {
    /// Validates arguments into a [`Command`] for `chain`, stamping queued
    /// transactions with `now_ms`.
    pub fn to_command(&self, chain: &Chain, now_ms: u64) -> Result<Command, ConfigError> {
        Ok(match self {
            CliCommand::List => Command::List,
            CliCommand::Queue {
                tx_hash,
                kind,
                title,
            } => {
                let kind = parse_kind(kind)?;
                let title = if title.is_empty() {
                    kind_title(kind)
                } else {
                    title.clone()
                };
                Command::Queue(Transaction::new(
                    parse_hash(tx_hash)?,
                    kind,
                    title,
                    chain.clone(),
                    now_ms,
                ))
            }
            CliCommand::Confirm {
                tx_hash,
                block_number,
                failed,
            } => {
                if *block_number == 0 {
                    return Err(ConfigError::ZeroBlockNumber);
                }
                Command::Confirm(Receipt {
                    tx_hash: parse_hash(tx_hash)?,
                    block_number: *block_number,
                    success: !failed,
                })
            }
            CliCommand::Reconcile { last_indexed_block } => Command::Reconcile(*last_indexed_block),
            CliCommand::Watch { until_empty } => Command::Watch {
                until_empty: *until_empty,
            },
            CliCommand::ClearHistory => Command::ClearHistory,
        })
    }
}

fn parse_hash(value: &str) -> Result<TxHash, ConfigError> {
    TxHash::from_str(value).map_err(|_| ConfigError::InvalidTxHash(value.to_string()))
}

fn parse_kind(value: &str) -> Result<TransactionKind, ConfigError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| ConfigError::InvalidKind(value.to_string()))
}

fn kind_title(kind: TransactionKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("Unknown transaction kind: {0}")]
    InvalidKind(String),

    #[error("block_number cannot be zero")]
    ZeroBlockNumber,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x1f1e1d1c1b1a191817161514131211100f0e0d0c0b0a09080706050403020100";

    #[test]
    fn test_queue_command() {
        let cli = CliCommand::Queue {
            tx_hash: HASH.to_string(),
            kind: "vault-deposit".to_string(),
            title: String::new(),
        };
        let Command::Queue(tx) = cli.to_command(&Chain::base(), 1234).unwrap() else {
            panic!("expected queue command");
        };
        assert_eq!(tx.tx_hash, TxHash::from_str(HASH).unwrap());
        assert_eq!(tx.kind, TransactionKind::VaultDeposit);
        assert_eq!(tx.title, "vault-deposit");
        assert_eq!(tx.timestamp, 1234);
        assert_eq!(tx.chain, Chain::base());
    }

    #[test]
    fn test_confirm_command() {
        let cli = CliCommand::Confirm {
            tx_hash: HASH.to_string(),
            block_number: 100,
            failed: true,
        };
        assert_eq!(
            cli.to_command(&Chain::base(), 0).unwrap(),
            Command::Confirm(Receipt {
                tx_hash: TxHash::from_str(HASH).unwrap(),
                block_number: 100,
                success: false,
            })
        );
    }

    #[test]
    fn test_invalid_arguments() {
        let cli = CliCommand::Queue {
            tx_hash: "0x1234".to_string(),
            kind: "swap".to_string(),
            title: String::new(),
        };
        assert!(matches!(
            cli.to_command(&Chain::base(), 0),
            Err(ConfigError::InvalidTxHash(_))
        ));

        let cli = CliCommand::Queue {
            tx_hash: HASH.to_string(),
            kind: "teleport".to_string(),
            title: String::new(),
        };
        assert!(matches!(
            cli.to_command(&Chain::base(), 0),
            Err(ConfigError::InvalidKind(_))
        ));

        let cli = CliCommand::Confirm {
            tx_hash: HASH.to_string(),
            block_number: 0,
            failed: false,
        };
        assert!(matches!(
            cli.to_command(&Chain::base(), 0),
            Err(ConfigError::ZeroBlockNumber)
        ));
    }
}
