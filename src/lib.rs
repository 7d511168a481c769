//! Clober exchange front-end core.
//!
//! # Overview
//!
//! Display-side logic shared by every screen of the exchange front end,
//! kept free of any UI toolkit:
//!
//! * [`format`] turns integer token amounts and decimal prices into
//!   precision-correct display strings.
//! * [`market`] collapses order-book levels reported by the trading SDK into
//!   tick-rounded depth rows and picks the depth granularities worth offering.
//! * [`ledger`] tracks the user's in-flight transactions from signature to
//!   indexer reconciliation and persists them per wallet address.
//!
//! On-chain reads, quote math and transaction signing stay with the external
//! SDK and wallet libraries; this crate consumes their outputs through the
//! [`market::PriceBook`] and [`ledger::IndexerHeight`] seams.
//!
//! # Testing
//!
//! [`testing`] module provides builders and a scripted indexer for driving
//! the ledger and depth aggregation without network access.

pub mod error;
pub mod format;
pub mod indexer;
pub mod ledger;
pub mod market;
pub mod num;
pub mod testing;
pub mod types;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Chain the exchange is operating on.
pub struct Chain {
    id: u64,
    name: String,
}

impl Chain {
    pub fn base() -> Self {
        Self::custom(8453, "Base")
    }

    pub fn monad_testnet() -> Self {
        Self::custom(10143, "Monad Testnet")
    }

    pub fn arbitrum_sepolia() -> Self {
        Self::custom(421614, "Arbitrum Sepolia")
    }

    pub fn custom(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Known chain for the ID, or an unnamed custom one.
    pub fn from_id(id: u64) -> Self {
        match id {
            8453 => Self::base(),
            10143 => Self::monad_testnet(),
            421614 => Self::arbitrum_sepolia(),
            _ => Self::custom(id, format!("Chain {id}")),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
