//! Error types for the transaction ledger tool.

use clober_core::error::{IndexerError, LedgerError, StorageError};

use crate::config::ConfigError;

/// Main error type for the transaction ledger tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(#[from] alloy_primitives::hex::FromHexError),

    #[error("Invalid indexer URL: {0}")]
    InvalidIndexerUrl(#[from] url::ParseError),

    #[error("INDEXER_URL is required to watch the indexer")]
    MissingIndexerUrl,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    #[error("Indexer stream closed unexpectedly")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
