use std::io;

/// Failure reading or writing the local key-value storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Error returned by the transaction ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("no wallet account selected")]
    NoAccount,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("malformed stored transactions under {key}: {source}")]
    Malformed {
        key: String,
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Error returned by the indexer height query.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("indexer responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("indexer returned errors: {0}")]
    Query(String),

    #[error("unexpected empty indexer response")]
    NullResp,

    #[error("no indexer configured for chain {0}")]
    UnknownChain(u64),
}

/// Error returned by the tick/price lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceError {
    #[error("tick {0} is out of range")]
    TickOutOfRange(i32),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(String),

    #[error("price {0} is outside of the representable tick range")]
    PriceOutOfRange(String),
}

/// Error returned by the depth aggregation when the SDK market is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DepthError {
    #[error("invalid base amount {amount:?} at tick {tick}")]
    InvalidAmount { tick: i32, amount: String },

    #[error("price lookup failed: {0}")]
    Price(#[from] PriceError),
}

/// Error returned by integer amount parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitsError {
    #[error("invalid decimal amount: {0:?}")]
    Invalid(String),

    #[error("negative amount: {0}")]
    Negative(String),

    #[error("amount does not fit into 256 bits: {0}")]
    Overflow(String),
}
