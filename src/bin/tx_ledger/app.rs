//! Ledger commands and the indexer watch loop.

use std::{pin::pin, time::Duration};

use clober_core::{
    format::format_with_commas,
    indexer::SubgraphIndexer,
    ledger::{self, FileStorage, Transaction, TransactionLedger, TransactionStatus},
};
use futures::StreamExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::Command,
    error::{Error, Result},
};

/// File-backed ledger of one wallet on one chain.
#[derive(Debug)]
pub struct LedgerApp {
    ledger: TransactionLedger<FileStorage>,
    indexer_url: Option<Url>,
    poll_interval: Duration,
}

impl LedgerApp {
    pub fn new(
        ledger: TransactionLedger<FileStorage>,
        indexer_url: Option<Url>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            ledger,
            indexer_url,
            poll_interval,
        }
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::List => self.print(),
            Command::Queue(transaction) => {
                self.ledger.queue_pending_transaction(transaction)?;
            }
            Command::Confirm(receipt) => {
                if !self.ledger.update_pending_transaction(&receipt)? {
                    eprintln!("No pending transaction {}", receipt.tx_hash);
                }
            }
            Command::Reconcile(height) => {
                let outcome = self.ledger.reconcile(height)?;
                println!(
                    "Promoted: {} │ Discarded: {} │ Still pending: {}",
                    outcome.promoted.len(),
                    outcome.discarded.len(),
                    self.ledger.pending_transactions().len()
                );
            }
            Command::Watch { until_empty } => self.watch(until_empty).await?,
            Command::ClearHistory => {
                let removed = self.ledger.clear_history()?;
                println!("Removed {removed} transactions from history");
            }
        }
        Ok(())
    }

    async fn watch(&mut self, until_empty: bool) -> Result<()> {
        let url = self.indexer_url.clone().ok_or(Error::MissingIndexerUrl)?;
        let chain_id = self.ledger.chain().id();
        let indexer = SubgraphIndexer::new()?.with_endpoint(chain_id, url);
        info!(
            chain_id,
            poll_interval = ?self.poll_interval,
            pending = self.ledger.pending_transactions().len(),
            "watching indexer"
        );

        let mut heights = pin!(ledger::indexed_blocks(
            &indexer,
            chain_id,
            self.poll_interval,
            tokio::time::sleep,
        ));
        let mut last_seen = 0;
        loop {
            if until_empty && self.ledger.pending_transactions().is_empty() {
                info!("no pending transactions left");
                return Ok(());
            }
            let height = heights.next().await.ok_or(Error::StreamClosed)?;
            if height != 0 && height < last_seen {
                warn!(height, last_seen, "indexer height went backwards");
            }
            if height == last_seen {
                debug!(height, "indexer height unchanged");
                continue;
            }
            last_seen = height;

            let outcome = self.ledger.reconcile(height)?;
            if !outcome.is_empty() {
                info!(
                    height,
                    promoted = outcome.promoted.len(),
                    discarded = outcome.discarded.len(),
                    "reconciled"
                );
            }
        }
    }

    fn print(&self) {
        let chain = self.ledger.chain();
        println!(
            "\n{:=^96}",
            format!(" {} ({}) ", chain.name(), chain.id())
        );

        println!("{:^96}", "PENDING");
        println!("{:-^96}", "");
        for tx in self.ledger.pending_transactions() {
            print_transaction(tx);
        }

        println!("{:^96}", "HISTORY");
        println!("{:-^96}", "");
        for tx in self.ledger.transaction_history() {
            print_transaction(tx);
        }
    }
}

fn print_transaction(tx: &Transaction) {
    let status = match tx.status() {
        TransactionStatus::Pending => "pending".to_string(),
        TransactionStatus::Confirmed { block } => {
            format!("block {}", format_with_commas(block.to_string()))
        }
        TransactionStatus::Failed { .. } => "failed".to_string(),
    };
    println!(
        "{} │ {:<14} │ {:<20} │ {}",
        tx.tx_hash,
        format!("{:?}", tx.kind),
        tx.title,
        status
    );
    for field in &tx.fields {
        println!(
            "{:>68} │ {} {}",
            field.label,
            field.primary_text.as_deref().unwrap_or_default(),
            field.secondary_text.as_deref().unwrap_or_default()
        );
    }
}
