//! Batch committer implementation.
//!
//! One [`BatchCommitter`] belongs to exactly one worker; every method takes
//! `&mut self`, so the pending batch has a single writer.

mod commit;

use std::sync::Arc;
use tokio::time::Instant;

use crate::delivery::Delivery;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::storage::index::{DocumentSink, IndexDocument};

use super::types::{BatchEvent, CommitStrategy};

/// Running totals for one committer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounters {
    pub written: usize,
    pub acked: usize,
    pub failed: usize,
    pub commits: usize,
    pub failed_commits: usize,
}

/// Writes documents to a sink and resolves their deliveries on commit.
pub struct BatchCommitter {
    sink: Arc<dyn DocumentSink>,
    strategy: CommitStrategy,
    pending: Vec<Delivery>,
    last_flush: Instant,
    stats: Arc<ProcessingStats>,
    counters: BatchCounters,
}

impl BatchCommitter {
    pub fn new(
        sink: Arc<dyn DocumentSink>,
        strategy: CommitStrategy,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        BatchCommitter {
            sink,
            pending: Vec::with_capacity(strategy.capacity()),
            strategy,
            last_flush: Instant::now(),
            stats,
            counters: BatchCounters::default(),
        }
    }

    pub fn strategy(&self) -> &CommitStrategy {
        &self.strategy
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn counters(&self) -> BatchCounters {
        self.counters
    }

    /// Writes `document` to the sink and defers `delivery` until the next commit.
    ///
    /// A failed write fails this delivery and every pending one.
    pub async fn submit(&mut self, document: &IndexDocument, delivery: Delivery) -> BatchEvent {
        if let Err(e) = self.sink.add(document).await {
            log::warn!("Index write failed for {}: {}", document.id, e);
            self.stats.increment_error(ErrorType::SinkAddFailure);
            delivery.fail();
            let failed = 1 + self.fail_pending();
            self.counters.failed += 1;
            return BatchEvent::WriteFailed { failed };
        }
        self.counters.written += 1;

        if !self.strategy.is_batching() {
            delivery.ack();
            self.counters.acked += 1;
            return BatchEvent::Acked;
        }

        self.pending.push(delivery);
        if self
            .strategy
            .should_commit(self.pending.len(), self.last_flush.elapsed())
        {
            self.commit().await
        } else {
            BatchEvent::Buffered {
                pending: self.pending.len(),
            }
        }
    }

    /// Periodic tick: commits whatever is pending regardless of the threshold.
    pub async fn on_tick(&mut self) -> BatchEvent {
        if self.pending.is_empty() {
            self.last_flush = Instant::now();
            return BatchEvent::Idle;
        }
        self.commit().await
    }

    /// Final commit before the worker stops.
    pub async fn finish(&mut self) -> BatchEvent {
        if self.pending.is_empty() {
            return BatchEvent::Idle;
        }
        log::debug!("Flushing {} pending deliveries on shutdown", self.pending.len());
        self.commit().await
    }
}
