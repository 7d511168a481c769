//! Pending transaction ledger.
//!
//! Transactions are queued the moment a wallet returns their hash, updated
//! once their receipt is mined and moved into history only after the
//! indexer has processed the mining block. Both lists are persisted per
//! wallet address through a [`Storage`] backend and filtered to the
//! selected chain when read.

mod poll;
mod storage;


pub use poll::{IndexerHeight, indexed_blocks};
pub use storage::{FileStorage, MemoryStorage, Storage};

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Chain,
    error::LedgerError,
    types::{Currency, TimestampMs},
};

/// What a transaction did, as labelled in the activity list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Approve,
    Swap,
    Make,
    Limit,
    Claim,
    Cancel,
    Wrap,
    Unwrap,
    Mint,
    Burn,
    VaultDeposit,
    VaultWithdraw,
}

/// Flow direction of a displayed field relative to the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldDirection {
    In,
    Out,
}

/// One labelled line shown under a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<FieldDirection>,
}

impl TransactionField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            currency: None,
            label: label.into(),
            primary_text: None,
            secondary_text: None,
            direction: None,
        }
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn primary_text(mut self, text: impl Into<String>) -> Self {
        self.primary_text = Some(text.into());
        self
    }

    pub fn secondary_text(mut self, text: impl Into<String>) -> Self {
        self.secondary_text = Some(text.into());
        self
    }

    pub fn direction(mut self, direction: FieldDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Persisted transaction record.
///
/// `block_number` and `success` stay unset until the receipt is mined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub tx_hash: TxHash,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub title: String,
    pub timestamp: TimestampMs,
    pub chain: Chain,
    #[serde(default)]
    pub fields: Vec<TransactionField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl Transaction {
    pub fn new(
        tx_hash: TxHash,
        kind: TransactionKind,
        title: impl Into<String>,
        chain: Chain,
        timestamp: TimestampMs,
    ) -> Self {
        Self {
            tx_hash,
            kind,
            title: title.into(),
            timestamp,
            chain,
            fields: Vec::new(),
            block_number: None,
            success: None,
        }
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = TransactionField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn status(&self) -> TransactionStatus {
        match (self.block_number, self.success) {
            (block, Some(false)) => TransactionStatus::Failed { block },
            (Some(block), Some(true)) => TransactionStatus::Confirmed { block },
            _ => TransactionStatus::Pending,
        }
    }

    fn apply(&mut self, receipt: &Receipt) {
        self.block_number = Some(receipt.block_number);
        self.success = Some(receipt.success);
    }
}

/// Lifecycle state derived from a transaction's receipt fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    /// Signed and submitted, receipt not yet known.
    Pending,
    /// Mined successfully in `block`.
    Confirmed { block: u64 },
    /// Reverted.
    Failed { block: Option<u64> },
}

/// Mined receipt of a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
}

/// Changes made by one [`TransactionLedger::reconcile`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Moved into history, in pending order.
    pub promoted: Vec<TxHash>,
    /// Dropped because their receipt reported failure.
    pub discarded: Vec<TxHash>,
}

impl ReconcileOutcome {
    pub fn is_empty(&self) -> bool {
        self.promoted.is_empty() && self.discarded.is_empty()
    }
}

/// Storage key of the pending list of `account`.
pub fn pending_key(account: &Address) -> String {
    format!("transactions-{account}-pending")
}

/// Storage key of the history list of `account`.
pub fn history_key(account: &Address) -> String {
    format!("transactions-{account}-confirmed")
}

/// Pending and historical transactions of the selected wallet.
///
/// Lists hold every chain's records of the account in storage order;
/// accessors and reconciliation only look at the selected chain.
#[derive(Debug)]
pub struct TransactionLedger<S> {
    storage: S,
    chain: Chain,
    account: Option<Address>,
    pending: Vec<Transaction>,
    history: Vec<Transaction>,
}

impl<S: Storage> TransactionLedger<S> {
    pub fn new(storage: S, chain: Chain) -> Self {
        Self {
            storage,
            chain,
            account: None,
            pending: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Switches to `account`, loading its persisted lists. `None` disconnects.
    pub fn select_account(&mut self, account: Option<Address>) -> Result<(), LedgerError> {
        let (pending, history) = match &account {
            Some(account) => (
                self.load(&pending_key(account))?,
                self.load(&history_key(account))?,
            ),
            None => (Vec::new(), Vec::new()),
        };
        debug!(
            account = ?account,
            pending = pending.len(),
            history = history.len(),
            "selected account"
        );
        self.account = account;
        self.pending = pending;
        self.history = history;
        Ok(())
    }

    pub fn select_chain(&mut self, chain: Chain) {
        debug!(chain_id = chain.id(), "selected chain");
        self.chain = chain;
    }

    /// Pending transactions on the selected chain, oldest first.
    pub fn pending_transactions(&self) -> Vec<&Transaction> {
        on_chain(&self.pending, self.chain.id()).collect()
    }

    /// Reconciled transactions on the selected chain, most recent first.
    pub fn transaction_history(&self) -> Vec<&Transaction> {
        on_chain(&self.history, self.chain.id()).collect()
    }

    /// Appends a freshly signed transaction to the pending list.
    pub fn queue_pending_transaction(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        let account = self.require_account()?;
        let mut pending = self.load(&pending_key(&account))?;
        info!(
            tx_hash = %transaction.tx_hash,
            kind = ?transaction.kind,
            chain_id = transaction.chain.id(),
            "queued pending transaction"
        );
        pending.push(transaction);
        self.store(&pending_key(&account), &pending)?;
        self.pending = pending;
        Ok(())
    }

    /// Records a mined receipt on the matching pending transaction.
    ///
    /// Returns whether a pending transaction with that hash was found.
    pub fn update_pending_transaction(&mut self, receipt: &Receipt) -> Result<bool, LedgerError> {
        let account = self.require_account()?;
        let mut pending = self.load(&pending_key(&account))?;
        let Some(transaction) = pending.iter_mut().find(|t| t.tx_hash == receipt.tx_hash) else {
            warn!(tx_hash = %receipt.tx_hash, "receipt for unknown pending transaction");
            self.pending = pending;
            return Ok(false);
        };
        transaction.apply(receipt);
        self.store(&pending_key(&account), &pending)?;
        info!(
            tx_hash = %receipt.tx_hash,
            block_number = receipt.block_number,
            success = receipt.success,
            "pending transaction mined"
        );
        self.pending = pending;
        Ok(true)
    }

    /// Settles pending transactions of the selected chain against the
    /// indexer's `last_indexed_block`.
    ///
    /// Failed transactions are dropped. Successful ones move to the front of
    /// history once the indexer has reached their block. Transactions still
    /// waiting for a receipt are kept. A height of 0 means the indexer is
    /// unavailable and nothing changes.
    ///
    /// History is written before pending, so a record left in both lists by
    /// an interrupted pass is only dropped from pending the next time.
    pub fn reconcile(&mut self, last_indexed_block: u64) -> Result<ReconcileOutcome, LedgerError> {
        let account = self.require_account()?;
        if last_indexed_block == 0 {
            debug!("indexer unavailable, skipping reconciliation");
            return Ok(ReconcileOutcome::default());
        }

        let pending = self.load(&pending_key(&account))?;
        let mut history = self.load(&history_key(&account))?;
        let chain_id = self.chain.id();
        let mut outcome = ReconcileOutcome::default();
        let mut promoted = Vec::new();
        let mut kept = Vec::with_capacity(pending.len());
        for transaction in pending {
            if transaction.chain.id() != chain_id {
                kept.push(transaction);
                continue;
            }
            match transaction.status() {
                TransactionStatus::Failed { block } => {
                    info!(tx_hash = %transaction.tx_hash, block_number = ?block, "discarded failed transaction");
                    outcome.discarded.push(transaction.tx_hash);
                }
                TransactionStatus::Confirmed { block } if block <= last_indexed_block => {
                    info!(
                        tx_hash = %transaction.tx_hash,
                        block_number = block,
                        last_indexed_block,
                        "transaction indexed"
                    );
                    outcome.promoted.push(transaction.tx_hash);
                    if history.iter().any(|t| t.tx_hash == transaction.tx_hash) {
                        debug!(tx_hash = %transaction.tx_hash, "already in history");
                    } else {
                        promoted.push(transaction);
                    }
                }
                _ => kept.push(transaction),
            }
        }

        if outcome.is_empty() {
            self.pending = kept;
            self.history = history;
            return Ok(outcome);
        }
        if !promoted.is_empty() {
            promoted.reverse();
            promoted.append(&mut history);
            history = promoted;
            self.store(&history_key(&account), &history)?;
        }
        self.history = history;
        self.store(&pending_key(&account), &kept)?;
        self.pending = kept;
        Ok(outcome)
    }

    /// Drops the selected chain's history. Returns the number removed.
    pub fn clear_history(&mut self) -> Result<usize, LedgerError> {
        let account = self.require_account()?;
        let chain_id = self.chain.id();
        let mut history = self.load(&history_key(&account))?;
        let before = history.len();
        history.retain(|t| t.chain.id() != chain_id);
        let removed = before - history.len();
        if removed > 0 {
            self.store(&history_key(&account), &history)?;
            info!(removed, chain_id, "cleared transaction history");
        }
        self.history = history;
        Ok(removed)
    }

    fn require_account(&self) -> Result<Address, LedgerError> {
        self.account.ok_or(LedgerError::NoAccount)
    }

    fn load(&self, key: &str) -> Result<Vec<Transaction>, LedgerError> {
        match self.storage.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| LedgerError::Malformed {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    fn store(&self, key: &str, list: &[Transaction]) -> Result<(), LedgerError> {
        self.storage.set(key, &serde_json::to_string(list)?)?;
        Ok(())
    }
}

fn on_chain(list: &[Transaction], chain_id: u64) -> impl Iterator<Item = &Transaction> {
    list.iter().filter(move |t| t.chain.id() == chain_id)
}
