//! Resolution status records.
//!
//! One row per original URL. Writes are merges: a success sets `expanded_url`
//! and `domain`, a failure sets `status`, and neither touches the other
//! columns. Replaying the same write leaves the row unchanged, so at-least-once
//! reprocessing is safe.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tokio_retry::Retry;

use crate::config::STATUS_FAILED;
use crate::error_handling::{get_retry_strategy, DatabaseError, ErrorType, ProcessingStats};

/// A persisted status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub url: String,
    pub expanded_url: Option<String>,
    pub domain: Option<String>,
    pub status: Option<String>,
}

/// Storage backend for status records.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Sets `expanded_url` and `domain` on the record keyed by `url`.
    async fn record_success(
        &self,
        url: &str,
        expanded_url: &str,
        domain: &str,
    ) -> Result<(), DatabaseError>;

    /// Sets `status = "failed"` on the record keyed by `url`.
    async fn record_failure(&self, url: &str) -> Result<(), DatabaseError>;
}

/// SQLite implementation over the `url_status` table.
#[derive(Clone)]
pub struct SqliteStatusStore {
    pool: SqlitePool,
}

impl SqliteStatusStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStatusStore { pool }
    }

    /// Fetches the record for `url`, if any.
    pub async fn fetch(&self, url: &str) -> Result<Option<StatusRecord>, DatabaseError> {
        let row = sqlx::query(
            "SELECT url, expanded_url, domain, status FROM url_status WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StatusRecord {
            url: row.get("url"),
            expanded_url: row.get("expanded_url"),
            domain: row.get("domain"),
            status: row.get("status"),
        }))
    }
}

#[async_trait]
impl StatusStore for SqliteStatusStore {
    async fn record_success(
        &self,
        url: &str,
        expanded_url: &str,
        domain: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO url_status (url, expanded_url, domain) VALUES (?, ?, ?)
             ON CONFLICT(url) DO UPDATE SET
                expanded_url = excluded.expanded_url,
                domain = excluded.domain",
        )
        .bind(url)
        .bind(expanded_url)
        .bind(domain)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_failure(&self, url: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO url_status (url, status) VALUES (?, ?)
             ON CONFLICT(url) DO UPDATE SET status = excluded.status",
        )
        .bind(url)
        .bind(STATUS_FAILED)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Writes status records with retry.
///
/// Each write is retried with exponential backoff; a write that still fails is
/// logged, counted as `PersistenceFailure` and returned to the caller.
#[derive(Clone)]
pub struct StatusRecorder {
    store: Arc<dyn StatusStore>,
    stats: Arc<ProcessingStats>,
}

impl StatusRecorder {
    pub fn new(store: Arc<dyn StatusStore>, stats: Arc<ProcessingStats>) -> Self {
        StatusRecorder { store, stats }
    }

    pub async fn record_success(
        &self,
        url: &str,
        expanded_url: &str,
        domain: &str,
    ) -> Result<(), DatabaseError> {
        let result = Retry::start(get_retry_strategy(), || {
            self.store.record_success(url, expanded_url, domain)
        })
        .await;
        self.report(url, result)
    }

    pub async fn record_failure(&self, url: &str) -> Result<(), DatabaseError> {
        let result = Retry::start(get_retry_strategy(), || self.store.record_failure(url)).await;
        self.report(url, result)
    }

    fn report(
        &self,
        url: &str,
        result: Result<(), DatabaseError>,
    ) -> Result<(), DatabaseError> {
        if let Err(ref e) = result {
            log::error!("Failed to write status record for {}: {}", url, e);
            self.stats.increment_error(ErrorType::PersistenceFailure);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_pool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_record_success_inserts_row() {
        let store = SqliteStatusStore::new(create_test_pool().await);
        store
            .record_success(
                "http://short.ly/abc",
                "http://www.youtube.com/watch?v=xyz",
                "www.youtube.com",
            )
            .await
            .expect("write");

        let record = store
            .fetch("http://short.ly/abc")
            .await
            .expect("read")
            .expect("row exists");
        assert_eq!(
            record.expanded_url.as_deref(),
            Some("http://www.youtube.com/watch?v=xyz")
        );
        assert_eq!(record.domain.as_deref(), Some("www.youtube.com"));
        assert_eq!(record.status, None);
    }

    #[tokio::test]
    async fn test_record_failure_is_idempotent() {
        let store = SqliteStatusStore::new(create_test_pool().await);
        store.record_failure("http://a.com/x").await.expect("first");
        let once = store.fetch("http://a.com/x").await.expect("read");

        store.record_failure("http://a.com/x").await.expect("second");
        let twice = store.fetch("http://a.com/x").await.expect("read");

        assert_eq!(once, twice);
        assert_eq!(
            twice.expect("row exists").status.as_deref(),
            Some("failed")
        );

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_status")
            .fetch_one(&store.pool)
            .await
            .expect("count");
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_merge_leaves_other_fields_untouched() {
        let store = SqliteStatusStore::new(create_test_pool().await);
        store
            .record_success("http://a.com/x", "http://b.com/y", "b.com")
            .await
            .expect("success");
        store.record_failure("http://a.com/x").await.expect("failure");

        let record = store
            .fetch("http://a.com/x")
            .await
            .expect("read")
            .expect("row exists");
        assert_eq!(record.expanded_url.as_deref(), Some("http://b.com/y"));
        assert_eq!(record.domain.as_deref(), Some("b.com"));
        assert_eq!(record.status.as_deref(), Some("failed"));
    }

    #[tokio::test]
    async fn test_last_success_wins() {
        let store = SqliteStatusStore::new(create_test_pool().await);
        store
            .record_success("http://a.com/x", "http://b.com/1", "b.com")
            .await
            .expect("first");
        store
            .record_success("http://a.com/x", "http://c.com/2", "c.com")
            .await
            .expect("second");

        let record = store
            .fetch("http://a.com/x")
            .await
            .expect("read")
            .expect("row exists");
        assert_eq!(record.expanded_url.as_deref(), Some("http://c.com/2"));
        assert_eq!(record.domain.as_deref(), Some("c.com"));
    }

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyStore {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusStore for FlakyStore {
        async fn record_success(&self, _: &str, _: &str, _: &str) -> Result<(), DatabaseError> {
            self.record_failure("").await
        }

        async fn record_failure(&self, _: &str) -> Result<(), DatabaseError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(DatabaseError::SqlError(sqlx::Error::PoolTimedOut))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_recorder_retries_transient_failures() {
        let store = Arc::new(FlakyStore {
            failures: 2,
            calls: AtomicUsize::new(0),
        });
        let stats = Arc::new(ProcessingStats::new());
        let recorder = StatusRecorder::new(store.clone(), stats.clone());

        assert!(recorder.record_failure("http://a.com/x").await.is_ok());
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
        assert_eq!(stats.get_error_count(ErrorType::PersistenceFailure), 0);
    }

    #[tokio::test]
    async fn test_recorder_gives_up_and_counts() {
        let store = Arc::new(FlakyStore {
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
        });
        let stats = Arc::new(ProcessingStats::new());
        let recorder = StatusRecorder::new(store.clone(), stats.clone());

        assert!(recorder
            .record_success("http://a.com/x", "http://b.com", "b.com")
            .await
            .is_err());
        assert_eq!(
            store.calls.load(Ordering::SeqCst),
            crate::config::RETRY_MAX_ATTEMPTS + 1
        );
        assert_eq!(stats.get_error_count(ErrorType::PersistenceFailure), 1);
    }
}
