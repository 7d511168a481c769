use std::time::Duration;

use futures::{Stream, stream};
use tracing::{debug, warn};

use crate::error::IndexerError;

/// Source of the last block number an indexer has processed.
pub trait IndexerHeight {
    fn last_indexed_block(
        &self,
        chain_id: u64,
    ) -> impl Future<Output = Result<u64, IndexerError>> + Send;
}

impl<I: IndexerHeight + ?Sized> IndexerHeight for &I {
    fn last_indexed_block(
        &self,
        chain_id: u64,
    ) -> impl Future<Output = Result<u64, IndexerError>> + Send {
        (**self).last_indexed_block(chain_id)
    }
}

/// Returns an endless stream of indexer heights for `chain_id`, one per
/// poll, polling immediately and then every `interval`.
///
/// A failed query is logged and yields 0, which the ledger treats as an
/// unavailable indexer.
pub fn indexed_blocks<I, S, SFut>(
    indexer: I,
    chain_id: u64,
    interval: Duration,
    sleep: S,
) -> impl Stream<Item = u64>
where
    I: IndexerHeight,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    stream::unfold((indexer, true), move |(indexer, first)| async move {
        if !first {
            sleep(interval).await;
        }
        let height = match indexer.last_indexed_block(chain_id).await {
            Ok(height) => {
                debug!(chain_id, height, "indexer height");
                height
            }
            Err(err) => {
                warn!(chain_id, %err, "indexer height query failed");
                0
            }
        };
        Some((height, (indexer, false)))
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::testing::ScriptedIndexer;

    #[tokio::test]
    async fn test_indexed_blocks_follows_indexer() {
        let indexer = ScriptedIndexer::new([Ok(98), Ok(99), Ok(100)]);
        let heights = indexed_blocks(&indexer, 8453, Duration::from_secs(2), |_| async {})
            .take(4)
            .collect::<Vec<_>>()
            .await;
        // The script keeps reporting its last height once exhausted.
        assert_eq!(heights, vec![98, 99, 100, 100]);
        assert_eq!(indexer.calls(), 4);
    }

    #[tokio::test]
    async fn test_indexed_blocks_maps_errors_to_zero() {
        let indexer = ScriptedIndexer::new([Ok(10), Err(IndexerError::NullResp), Ok(11)]);
        let heights = indexed_blocks(&indexer, 8453, Duration::from_secs(2), |_| async {})
            .take(3)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(heights, vec![10, 0, 11]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_indexed_blocks_sleeps_between_polls() {
        let indexer = ScriptedIndexer::new([Ok(1), Ok(2), Ok(3)]);
        let started = tokio::time::Instant::now();
        let heights = indexed_blocks(&indexer, 8453, Duration::from_secs(5), tokio::time::sleep)
            .take(3)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(heights, vec![1, 2, 3]);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }
}
