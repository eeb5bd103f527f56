//! Search-index stage: feeds `webpages` emissions to a batch committer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::delivery::Envelope;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::route::ArticleEmission;
use crate::storage::{BatchCommitter, BatchCounters, BatchEvent, IndexDocument};

use super::{Outcome, Stage};

pub struct IndexStage {
    committer: BatchCommitter,
    stats: Arc<ProcessingStats>,
}

impl IndexStage {
    pub fn new(committer: BatchCommitter, stats: Arc<ProcessingStats>) -> Self {
        IndexStage { committer, stats }
    }

    pub fn counters(&self) -> BatchCounters {
        self.committer.counters()
    }
}

#[async_trait]
impl Stage for IndexStage {
    type Input = ArticleEmission;

    fn name(&self) -> &'static str {
        "index"
    }

    async fn process_item(&mut self, envelope: Envelope<ArticleEmission>) -> Outcome {
        let Envelope { payload, delivery } = envelope;
        let document = match IndexDocument::from_item(&payload.item, &payload.domain) {
            Ok(document) => document,
            Err(e) => {
                log::error!("Cannot build index document for {}: {}", payload.item.original_url, e);
                self.stats.increment_error(ErrorType::SinkAddFailure);
                delivery.fail();
                return Outcome::Failed;
            }
        };

        match self.committer.submit(&document, delivery).await {
            BatchEvent::Acked | BatchEvent::Committed { .. } => Outcome::Acked,
            BatchEvent::Buffered { .. } | BatchEvent::Idle => Outcome::Deferred,
            BatchEvent::CommitFailed { .. } | BatchEvent::WriteFailed { .. } => Outcome::Failed,
        }
    }

    async fn on_tick(&mut self) {
        self.committer.on_tick().await;
    }

    async fn finish(&mut self) {
        self.committer.finish().await;
    }

    fn tick_interval(&self) -> Option<Duration> {
        self.committer.strategy().tick_interval()
    }
}
