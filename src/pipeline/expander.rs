//! Resolve, classify, record and route.

use std::sync::Arc;

use async_trait::async_trait;

use crate::delivery::Envelope;
use crate::domain::ClassificationSet;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats, ResolutionError};
use crate::fetch::UrlResolver;
use crate::models::{Classification, InputItem, WorkItem};
use crate::route::Emitter;
use crate::storage::StatusRecorder;

use super::{Outcome, Stage};

/// The URL expansion stage.
///
/// Each item is resolved to its canonical URL, classified by host, recorded in
/// the status store and emitted on `mediaitems` or `webpages`. A resolution
/// failure is recorded and, unless `fail_unresolved` is set, still acked.
pub struct ExpanderStage {
    resolver: Arc<dyn UrlResolver>,
    classifier: ClassificationSet,
    recorder: StatusRecorder,
    emitter: Emitter,
    stats: Arc<ProcessingStats>,
    fail_unresolved: bool,
}

impl ExpanderStage {
    pub fn new(
        resolver: Arc<dyn UrlResolver>,
        classifier: ClassificationSet,
        recorder: StatusRecorder,
        emitter: Emitter,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        ExpanderStage {
            resolver,
            classifier,
            recorder,
            emitter,
            stats,
            fail_unresolved: false,
        }
    }

    /// Fail resolution failures instead of acking them, so they are redelivered.
    pub fn fail_unresolved(mut self, enabled: bool) -> Self {
        self.fail_unresolved = enabled;
        self
    }

    async fn expand(&self, item: &mut WorkItem) -> Result<(String, Classification), ResolutionError> {
        let resolution = self.resolver.resolve(&item.original_url).await?;
        if resolution.hops() > 0 {
            self.stats.increment_info(InfoType::Redirected);
        }
        if resolution.hops() >= self.resolver.max_redirects() {
            log::debug!(
                "Stopped after {} hops for {}, accepting {}",
                resolution.hops(),
                item.original_url,
                resolution.canonical_url
            );
            self.stats.increment_info(InfoType::HopLimitReached);
        }

        let (domain, class) = self.classifier.classify(&resolution.canonical_url)?;

        // A failed status write is logged and counted by the recorder; routing goes on
        let _ = self
            .recorder
            .record_success(&item.original_url, &resolution.canonical_url, &domain)
            .await;

        item.resolved(resolution.canonical_url, domain.clone(), class);
        Ok((domain, class))
    }
}

#[async_trait]
impl Stage for ExpanderStage {
    type Input = InputItem;

    fn name(&self) -> &'static str {
        "expander"
    }

    async fn process_item(&mut self, envelope: Envelope<InputItem>) -> Outcome {
        let Envelope { payload, delivery } = envelope;

        let Some(mut item) = WorkItem::from_input(payload) else {
            log::warn!("Item {} has no url, failing it", delivery.id());
            self.stats.increment_error(ErrorType::MalformedInput);
            delivery.fail();
            return Outcome::Failed;
        };

        match self.expand(&mut item).await {
            Ok((domain, class)) => match self.emitter.route(item, class, domain, delivery).await {
                Ok(()) => Outcome::Acked,
                Err(_) => Outcome::Failed,
            },
            Err(e) => {
                item.failed();
                log::warn!("Could not resolve {}: {}", item.original_url, e);
                if e.url() != item.original_url {
                    log::debug!("Redirect chain for {} broke at {}", item.original_url, e.url());
                }
                self.stats.increment_error(e.error_type());
                let _ = self.recorder.record_failure(&item.original_url).await;
                if self.fail_unresolved {
                    delivery.fail();
                    Outcome::Failed
                } else {
                    delivery.ack();
                    Outcome::Acked
                }
            }
        }
    }
}
