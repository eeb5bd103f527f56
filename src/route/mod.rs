//! Routing emitter.
//!
//! Sends a classified item on exactly one of the two output streams and then
//! resolves the upstream delivery. The stream senders are handed in at
//! construction; the emitter holds no other state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::delivery::Delivery;
use crate::error_handling::{EmitError, ErrorType, InfoType, ProcessingStats};
use crate::models::{Classification, WorkItem};

/// Payload of the `mediaitems` stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaEmission {
    pub item: WorkItem,
}

/// Payload of the `webpages` stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleEmission {
    pub item: WorkItem,
    pub domain: String,
}

#[derive(Clone)]
pub struct Emitter {
    media: mpsc::Sender<MediaEmission>,
    webpages: mpsc::Sender<ArticleEmission>,
    stats: Arc<ProcessingStats>,
}

impl Emitter {
    pub fn new(
        media: mpsc::Sender<MediaEmission>,
        webpages: mpsc::Sender<ArticleEmission>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Emitter {
            media,
            webpages,
            stats,
        }
    }

    /// Sends `item` on the stream matching `class`.
    pub async fn emit(
        &self,
        item: WorkItem,
        class: Classification,
        domain: String,
    ) -> Result<(), EmitError> {
        match class {
            Classification::Media => {
                self.media
                    .send(MediaEmission { item })
                    .await
                    .map_err(|_| EmitError::ChannelClosed(class.stream()))?;
                self.stats.increment_info(InfoType::MediaRouted);
            }
            Classification::Article => {
                self.webpages
                    .send(ArticleEmission { item, domain })
                    .await
                    .map_err(|_| EmitError::ChannelClosed(class.stream()))?;
                self.stats.increment_info(InfoType::ArticleRouted);
            }
        }
        Ok(())
    }

    /// Emits `item` and acks `delivery`, or fails it if the stream is closed.
    pub async fn route(
        &self,
        item: WorkItem,
        class: Classification,
        domain: String,
        delivery: Delivery,
    ) -> Result<(), EmitError> {
        let url = item.original_url.clone();
        match self.emit(item, class, domain).await {
            Ok(()) => {
                delivery.ack();
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to emit {}: {}", url, e);
                self.stats.increment_error(ErrorType::EmitFailure);
                delivery.fail();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryOutcome;

    fn emitter() -> (
        Emitter,
        mpsc::Receiver<MediaEmission>,
        mpsc::Receiver<ArticleEmission>,
        Arc<ProcessingStats>,
    ) {
        let (media_tx, media_rx) = mpsc::channel(4);
        let (web_tx, web_rx) = mpsc::channel(4);
        let stats = Arc::new(ProcessingStats::new());
        (
            Emitter::new(media_tx, web_tx, stats.clone()),
            media_rx,
            web_rx,
            stats,
        )
    }

    #[tokio::test]
    async fn test_media_goes_to_media_stream_only() {
        let (emitter, mut media, mut web, stats) = emitter();
        let (delivery, receipt) = Delivery::channel(1);

        emitter
            .route(
                WorkItem::new("http://short.ly/abc"),
                Classification::Media,
                "www.youtube.com".to_string(),
                delivery,
            )
            .await
            .expect("emit");

        let emitted = media.recv().await.expect("media emission");
        assert_eq!(emitted.item.original_url, "http://short.ly/abc");
        assert!(web.try_recv().is_err());
        assert_eq!(receipt.outcome().await, DeliveryOutcome::Acked);
        assert_eq!(stats.get_info_count(InfoType::MediaRouted), 1);
    }

    #[tokio::test]
    async fn test_article_carries_domain() {
        let (emitter, mut media, mut web, _) = emitter();

        emitter
            .emit(
                WorkItem::new("http://a.com/x"),
                Classification::Article,
                "news.example.org".to_string(),
            )
            .await
            .expect("emit");

        let emitted = web.recv().await.expect("webpage emission");
        assert_eq!(emitted.domain, "news.example.org");
        assert!(media.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_stream_fails_delivery() {
        let (emitter, media, _web, stats) = emitter();
        drop(media);
        let (delivery, receipt) = Delivery::channel(1);

        let result = emitter
            .route(
                WorkItem::new("http://short.ly/abc"),
                Classification::Media,
                "vimeo.com".to_string(),
                delivery,
            )
            .await;

        assert!(matches!(result, Err(EmitError::ChannelClosed("mediaitems"))));
        assert_eq!(receipt.outcome().await, DeliveryOutcome::Failed);
        assert_eq!(stats.get_error_count(ErrorType::EmitFailure), 1);
    }

    #[tokio::test]
    async fn test_closed_webpages_stream_is_named() {
        let (emitter, _media, web, _stats) = emitter();
        drop(web);

        let result = emitter
            .emit(
                WorkItem::new("http://short.ly/abc"),
                Classification::Article,
                "news.com".to_string(),
            )
            .await;

        assert!(matches!(result, Err(EmitError::ChannelClosed("webpages"))));
    }
}
