//! url_expander library: redirect expansion, routing and batched indexing
//!
//! Raw URLs are resolved through their redirect chains (with a hop bound and a
//! per-hop timeout), classified by the host of the canonical URL, recorded in a
//! SQLite status table and routed to one of two streams: `mediaitems` or
//! `webpages`. Web pages feed a search index whose commits are batched, with
//! every item acknowledged only once its batch is durable.
//!
//! # Example
//!
//! ```no_run
//! use url_expander::{run_pipeline, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("urls.txt"),
//!     commit_threshold: Some(50),
//!     ..Default::default()
//! };
//!
//! let report = run_pipeline(config).await?;
//! println!("Processed {} items: {} acked, {} failed",
//!          report.total_items, report.acked, report.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod app;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod models;
pub mod pipeline;
pub mod route;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use run::{run_pipeline, RunReport};
pub use storage::run_migrations;

// Internal run module (wires readers, workers and consumers together)
mod run {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        consume_media, log_progress, open_input, print_error_statistics, print_run_summary,
        read_input, shutdown_gracefully, Dispatcher,
    };
    use crate::config::{Config, LOGGING_INTERVAL, MEDIA_STREAM};
    use crate::domain::ClassificationSet;
    use crate::error_handling::ProcessingStats;
    use crate::fetch::{HttpResolver, UrlResolver};
    use crate::initialization::init_redirect_client;
    use crate::pipeline::{run_worker, ExpanderStage, IndexStage};
    use crate::route::Emitter;
    use crate::storage::{
        init_db_pool_with_path, run_migrations, BatchCommitter, BatchCounters, DocumentSink,
        SqliteIndexSink, SqliteStatusStore, StatusRecorder,
    };

    /// Results of a pipeline run.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RunReport {
        /// Items read from the input
        pub total_items: usize,
        /// Items acked by the expander, redeliveries included
        pub acked: usize,
        /// Items still failing after their last redelivery
        pub failed: usize,
        /// Items emitted on `mediaitems`
        pub media: usize,
        /// Items emitted on `webpages`
        pub articles: usize,
        /// Web pages durably indexed and acked
        pub indexed: usize,
        /// Successful index commits
        pub commits: usize,
        pub elapsed_seconds: f64,
    }

    /// Runs the expansion pipeline over `config.file`.
    ///
    /// # Errors
    ///
    /// Fails if the input cannot be opened, the database or HTTP client cannot be
    /// initialized, or the media output cannot be written. Per-item failures are
    /// counted, not returned.
    pub async fn run_pipeline(config: Config) -> Result<RunReport> {
        let start_time = Instant::now();
        let stats = Arc::new(ProcessingStats::new());

        let lines = open_input(&config.file)
            .await
            .with_context(|| format!("Failed to open input file {}", config.file.display()))?;

        let classifier = ClassificationSet::new(
            config
                .media_hosts()
                .context("Failed to load media host list")?,
        );
        info!(
            "Routing {} media host(s) to '{}'",
            classifier.len(),
            MEDIA_STREAM
        );

        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        let client = init_redirect_client(config.hop_timeout(), &config.user_agent)
            .context("Failed to initialize redirect client")?;
        let resolver: Arc<dyn UrlResolver> =
            Arc::new(HttpResolver::new(client, config.max_redirects));
        let recorder = StatusRecorder::new(
            Arc::new(SqliteStatusStore::new(pool.clone())),
            stats.clone(),
        );

        let strategy = config.commit_strategy();
        info!("Index commit strategy: {:?}", strategy);
        let sink: Arc<dyn DocumentSink> = if strategy.is_batching() {
            Arc::new(SqliteIndexSink::new(pool.clone()))
        } else {
            Arc::new(SqliteIndexSink::with_auto_commit(pool.clone()))
        };

        let workers = config.workers.max(1);
        let capacity = config.queue_capacity.max(1);
        let (media_tx, media_rx) = mpsc::channel(capacity);
        let (webpage_tx, webpage_rx) = mpsc::channel(capacity);

        let mut expander_queues = Vec::with_capacity(workers);
        let mut expander_tasks = Vec::with_capacity(workers);
        for _ in 0..workers {
            let (tx, rx) = mpsc::channel(capacity);
            let stage = ExpanderStage::new(
                Arc::clone(&resolver),
                classifier.clone(),
                recorder.clone(),
                Emitter::new(media_tx.clone(), webpage_tx.clone(), stats.clone()),
                stats.clone(),
            )
            .fail_unresolved(config.fail_unresolved);
            // The stage is dropped with the task, closing its emitter's senders
            expander_tasks.push(tokio::spawn(async move { run_worker(stage, rx).await.1 }));
            expander_queues.push(tx);
        }
        drop(media_tx);
        drop(webpage_tx);

        let mut index_queues = Vec::with_capacity(workers);
        let mut index_tasks = Vec::with_capacity(workers);
        for _ in 0..workers {
            let (tx, rx) = mpsc::channel(capacity);
            let committer = BatchCommitter::new(Arc::clone(&sink), strategy.clone(), stats.clone());
            let stage = IndexStage::new(committer, stats.clone());
            index_tasks.push(tokio::spawn(async move {
                let (stage, _) = run_worker(stage, rx).await;
                stage.counters()
            }));
            index_queues.push(tx);
        }

        let media_task = tokio::spawn(consume_media(media_rx, config.media_out.clone()));
        let index_dispatch = tokio::spawn(
            Dispatcher::new("index", index_queues, config.max_redeliveries, stats.clone())
                .run(webpage_rx),
        );

        let (input_tx, input_rx) = mpsc::channel(capacity);
        let input_task = tokio::spawn(read_input(lines, input_tx, stats.clone()));

        let completed = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let cancel_logging = cancel.child_token();
        let completed_for_logging = Arc::clone(&completed);
        let failed_for_logging = Arc::clone(&failed);
        let logging_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(LOGGING_INTERVAL);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &completed_for_logging, &failed_for_logging);
                    }
                    _ = cancel_logging.cancelled() => {
                        break;
                    }
                }
            }
        });

        let expander_report = Dispatcher::new(
            "expander",
            expander_queues,
            config.max_redeliveries,
            stats.clone(),
        )
        .with_progress(Arc::clone(&completed), Arc::clone(&failed))
        .run(input_rx)
        .await;

        let total_items = input_task.await.context("Input reader panicked")?;
        for task in expander_tasks {
            task.await.context("Expander worker panicked")?;
        }
        let index_report = index_dispatch.await.context("Index dispatcher panicked")?;
        let mut index_counters = BatchCounters::default();
        for task in index_tasks {
            let counters = task.await.context("Index worker panicked")?;
            index_counters.commits += counters.commits;
        }
        let media = media_task
            .await
            .context("Media consumer panicked")?
            .context("Failed to write media items")?;

        shutdown_gracefully(cancel, Some(logging_task)).await;
        log_progress(start_time, &completed, &failed);

        if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&pool)
            .await
        {
            log::warn!("Failed to checkpoint WAL file (this is non-critical): {}", e);
        }
        pool.close().await;

        print_error_statistics(&stats);

        let report = RunReport {
            total_items,
            acked: expander_report.acked,
            failed: expander_report.failed,
            media,
            articles: index_report.dispatched,
            indexed: index_report.acked,
            commits: index_counters.commits,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        };
        print_run_summary(&report);
        Ok(report)
    }
}
