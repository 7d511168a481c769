//! Test utilities.
//!
//! [`TransactionBuilder`] creates ledger records with controlled receipt
//! state, [`MarketBuilder`] creates order book snapshots whose level prices
//! agree with their ticks, and [`ScriptedIndexer`] replays a fixed sequence
//! of indexer heights.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use alloy_primitives::{Address, B256, TxHash, address};

use crate::{
    Chain,
    error::IndexerError,
    ledger::{IndexerHeight, Transaction, TransactionField, TransactionKind},
    market::{CloberTicks, Depth, Market, PriceBook},
    num,
    types::{Currency, OrderSide},
};

/// Wallet used by ledger tests.
pub const TEST_ACCOUNT: Address = address!("0x5F79EE8f8fA862E98201120d83c4eC39D9468D49");

/// Deterministic transaction hash for `n`.
pub fn tx_hash(n: u64) -> TxHash {
    B256::left_padding_from(&n.to_be_bytes())
}

pub fn weth() -> Currency {
    Currency::new(
        address!("0x4200000000000000000000000000000000000006"),
        "Wrapped Ether",
        "WETH",
        18,
    )
}

pub fn usdc() -> Currency {
    Currency::new(
        address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        "USD Coin",
        "USDC",
        6,
    )
}

/// Builder for [`Transaction`] records.
///
/// # Example
///
/// ```
/// use clober_core::{Chain, ledger::TransactionStatus, testing::TransactionBuilder};
///
/// let tx = TransactionBuilder::new(1).mined(100, true).build();
/// assert_eq!(tx.chain, Chain::base());
/// assert_eq!(tx.status(), TransactionStatus::Confirmed { block: 100 });
/// ```
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    tx_hash: TxHash,
    kind: TransactionKind,
    title: String,
    timestamp: u64,
    chain: Chain,
    fields: Vec<TransactionField>,
    block_number: Option<u64>,
    success: Option<bool>,
}

impl TransactionBuilder {
    /// Pending swap on Base with the hash [`tx_hash`]`(n)`.
    pub fn new(n: u64) -> Self {
        Self {
            tx_hash: tx_hash(n),
            kind: TransactionKind::Swap,
            title: "Swap".to_string(),
            timestamp: 1_700_000_000_000 + n,
            chain: Chain::base(),
            fields: Vec::new(),
            block_number: None,
            success: None,
        }
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    pub fn field(mut self, field: TransactionField) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the receipt fields as if mined in `block`.
    pub fn mined(mut self, block: u64, success: bool) -> Self {
        self.block_number = Some(block);
        self.success = Some(success);
        self
    }

    pub fn build(self) -> Transaction {
        let mut tx = Transaction::new(self.tx_hash, self.kind, self.title, self.chain, self.timestamp)
            .with_fields(self.fields);
        tx.block_number = self.block_number;
        tx.success = self.success;
        tx
    }
}

/// Builder for [`Market`] snapshots.
///
/// Level prices are derived from the tick with [`CloberTicks`], so they are
/// consistent with what depth aggregation recomputes.
#[derive(Clone, Debug)]
pub struct MarketBuilder {
    base: Currency,
    quote: Currency,
    bids: Vec<Depth>,
    asks: Vec<Depth>,
}

impl Default for MarketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketBuilder {
    /// WETH/USDC market without levels.
    pub fn new() -> Self {
        Self {
            base: weth(),
            quote: usdc(),
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    pub fn base(mut self, base: Currency) -> Self {
        self.base = base;
        self
    }

    pub fn quote(mut self, quote: Currency) -> Self {
        self.quote = quote;
        self
    }

    pub fn bid(mut self, tick: i32, base_amount: &str) -> Self {
        let level = self.level(tick, OrderSide::Bid, base_amount);
        self.bids.push(level);
        self
    }

    pub fn ask(mut self, tick: i32, base_amount: &str) -> Self {
        let level = self.level(tick, OrderSide::Ask, base_amount);
        self.asks.push(level);
        self
    }

    /// Adds a level with an arbitrary price string, bypassing tick math.
    pub fn raw_level(mut self, side: OrderSide, depth: Depth) -> Self {
        match side {
            OrderSide::Bid => self.bids.push(depth),
            OrderSide::Ask => self.asks.push(depth),
        }
        self
    }

    pub fn build(self) -> Market {
        Market {
            base: self.base,
            quote: self.quote,
            bids: self.bids,
            asks: self.asks,
        }
    }

    fn level(&self, tick: i32, side: OrderSide, base_amount: &str) -> Depth {
        let price = CloberTicks::new(self.base.decimals, self.quote.decimals)
            .tick_price(tick, side)
            .unwrap();
        Depth::new(num::render_plain(&price), tick, base_amount)
    }
}

/// Indexer replaying a scripted sequence of answers.
///
/// Once the script is exhausted the last successful height is repeated.
#[derive(Debug, Default)]
pub struct ScriptedIndexer {
    script: Mutex<VecDeque<Result<u64, IndexerError>>>,
    last: AtomicU64,
    calls: AtomicUsize,
}

impl ScriptedIndexer {
    pub fn new(script: impl IntoIterator<Item = Result<u64, IndexerError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: AtomicU64::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<u64, IndexerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(height)) => {
                self.last.store(height, Ordering::SeqCst);
                Ok(height)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last.load(Ordering::SeqCst)),
        }
    }
}

impl IndexerHeight for ScriptedIndexer {
    fn last_indexed_block(
        &self,
        _chain_id: u64,
    ) -> impl Future<Output = Result<u64, IndexerError>> + Send {
        futures::future::ready(self.next())
    }
}
