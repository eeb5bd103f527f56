//! Commit and batch resolution.

use tokio::time::Instant;

use crate::error_handling::{ErrorType, InfoType};

use super::BatchCommitter;
use crate::storage::batch::types::BatchEvent;

impl BatchCommitter {
    /// Commits the sink and resolves every pending delivery with the result.
    ///
    /// The batch is drained before the commit call, so it is empty afterwards
    /// whatever the outcome.
    pub(super) async fn commit(&mut self) -> BatchEvent {
        let batch: Vec<_> = self.pending.drain(..).collect();
        let count = batch.len();
        self.last_flush = Instant::now();

        match self.sink.commit().await {
            Ok(()) => {
                for delivery in batch {
                    delivery.ack();
                }
                self.counters.acked += count;
                self.counters.commits += 1;
                self.stats.increment_info(InfoType::BatchCommitted);
                log::debug!("Committed batch of {} documents", count);
                BatchEvent::Committed { acked: count }
            }
            Err(e) => {
                log::error!("Commit failed, failing {} pending deliveries: {}", count, e);
                self.stats.increment_error(ErrorType::CommitFailure);
                for delivery in batch {
                    delivery.fail();
                }
                self.counters.failed += count;
                self.counters.failed_commits += 1;
                BatchEvent::CommitFailed { failed: count }
            }
        }
    }

    /// Fails every pending delivery without committing. Returns how many.
    pub(super) fn fail_pending(&mut self) -> usize {
        let count = self.pending.len();
        for delivery in self.pending.drain(..) {
            delivery.fail();
        }
        if count > 0 {
            log::warn!("Failed {} pending deliveries after a write error", count);
        }
        self.counters.failed += count;
        self.last_flush = Instant::now();
        count
    }
}
