use std::{path::PathBuf, time::Duration};

use clober_core::{
    Chain,
    error::IndexerError,
    ledger::{self, FileStorage, Receipt, TransactionLedger},
    testing::{ScriptedIndexer, TEST_ACCOUNT, TransactionBuilder, tx_hash},
};
use futures::StreamExt;
use tokio_test::assert_ok;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("clober-core-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn open(dir: &PathBuf) -> TransactionLedger<FileStorage> {
    let mut ledger = TransactionLedger::new(assert_ok!(FileStorage::open(dir)), Chain::base());
    assert_ok!(ledger.select_account(Some(TEST_ACCOUNT)));
    ledger
}

/// A transaction mined in block 100 is only moved to history once the
/// indexer reports block 100, and the move survives a reload.
#[test]
fn test_file_backed_reconciliation() {
    let dir = temp_dir("reconcile");
    let mut ledger = open(&dir);

    assert_ok!(ledger.queue_pending_transaction(TransactionBuilder::new(1).build()));
    assert_ok!(ledger.update_pending_transaction(&Receipt {
        tx_hash: tx_hash(1),
        block_number: 100,
        success: true,
    }));

    assert!(assert_ok!(ledger.reconcile(99)).is_empty());
    assert_eq!(open(&dir).pending_transactions().len(), 1);

    let outcome = assert_ok!(ledger.reconcile(100));
    assert_eq!(outcome.promoted, vec![tx_hash(1)]);

    let reloaded = open(&dir);
    assert!(reloaded.pending_transactions().is_empty());
    let history = reloaded.transaction_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].block_number, Some(100));
    assert!(dir.join(format!("transactions-{TEST_ACCOUNT}-confirmed.json")).exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

/// A watcher process and a one-shot command share the ledger directory; the
/// watcher's reconciliation must keep what the command queued meanwhile.
#[test]
fn test_watcher_keeps_transactions_queued_by_another_process() {
    let dir = temp_dir("shared");
    let mut watcher = open(&dir);
    assert_ok!(watcher.queue_pending_transaction(TransactionBuilder::new(1).mined(5, true).build()));

    let mut command = open(&dir);
    assert_ok!(command.queue_pending_transaction(TransactionBuilder::new(2).build()));

    assert_eq!(assert_ok!(watcher.reconcile(5)).promoted, vec![tx_hash(1)]);

    let reloaded = open(&dir);
    let pending: Vec<_> = reloaded.pending_transactions().iter().map(|t| t.tx_hash).collect();
    assert_eq!(pending, vec![tx_hash(2)]);
    assert_eq!(reloaded.transaction_history().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

/// Drives the ledger from the indexer height stream the way a poll loop
/// does, including an indexer outage that must not change anything.
#[tokio::test]
async fn test_reconcile_from_indexer_stream() {
    let dir = temp_dir("stream");
    let mut ledger = open(&dir);
    assert_ok!(ledger.queue_pending_transaction(TransactionBuilder::new(1).mined(100, true).build()));
    assert_ok!(ledger.queue_pending_transaction(TransactionBuilder::new(2).mined(101, false).build()));
    assert_ok!(ledger.queue_pending_transaction(TransactionBuilder::new(3).build()));

    let indexer = ScriptedIndexer::new([Ok(99), Err(IndexerError::NullResp), Ok(100)]);
    let mut heights = Box::pin(ledger::indexed_blocks(
        &indexer,
        Chain::base().id(),
        Duration::from_millis(10),
        |_| async {},
    ));

    // 99: the failed transaction is dropped, the successful one waits.
    let outcome = assert_ok!(ledger.reconcile(heights.next().await.unwrap()));
    assert_eq!(outcome.discarded, vec![tx_hash(2)]);
    assert!(outcome.promoted.is_empty());

    // Outage surfaces as height 0.
    let height = heights.next().await.unwrap();
    assert_eq!(height, 0);
    assert!(assert_ok!(ledger.reconcile(height)).is_empty());
    assert_eq!(ledger.pending_transactions().len(), 2);

    // 100: caught up.
    let outcome = assert_ok!(ledger.reconcile(heights.next().await.unwrap()));
    assert_eq!(outcome.promoted, vec![tx_hash(1)]);
    let pending: Vec<_> = ledger.pending_transactions().iter().map(|t| t.tx_hash).collect();
    assert_eq!(pending, vec![tx_hash(3)]);

    std::fs::remove_dir_all(&dir).unwrap();
}
