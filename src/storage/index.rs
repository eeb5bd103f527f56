//! Durable search-index sink.
//!
//! Documents are written in two steps, the way a search server separates
//! indexing from committing: [`DocumentSink::add`] stages a document and
//! [`DocumentSink::commit`] makes everything staged durable and visible.
//! `add` is an upsert keyed by document id (the original URL), so a redelivered
//! item overwrites its earlier copy instead of duplicating it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::error_handling::{DatabaseError, SinkError};
use crate::models::WorkItem;

/// A document as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDocument {
    /// Stable key: the original URL of the item
    pub id: String,
    pub url: String,
    pub expanded_url: Option<String>,
    pub domain: Option<String>,
    /// Full item as JSON
    pub body: Value,
}

impl IndexDocument {
    /// Builds the document for a routed web page.
    pub fn from_item(item: &WorkItem, domain: &str) -> Result<Self, serde_json::Error> {
        Ok(IndexDocument {
            id: item.original_url.clone(),
            url: item.original_url.clone(),
            expanded_url: item.canonical_url.clone(),
            domain: Some(domain.to_string()),
            body: serde_json::to_value(item)?,
        })
    }
}

/// Write surface of a durable document store.
///
/// Both operations must report failure distinctly; the batch controller relies
/// on a failed `commit` meaning nothing since the last successful commit is
/// guaranteed durable.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn add(&self, document: &IndexDocument) -> Result<(), SinkError>;
    async fn commit(&self) -> Result<(), SinkError>;
}

/// SQLite-backed index over the `staged_documents` / `documents` tables.
///
/// In auto-commit mode `add` writes straight into `documents` and `commit` is a
/// no-op; used when every item is acknowledged after its own write.
#[derive(Clone)]
pub struct SqliteIndexSink {
    pool: SqlitePool,
    auto_commit: bool,
}

impl SqliteIndexSink {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteIndexSink {
            pool,
            auto_commit: false,
        }
    }

    pub fn with_auto_commit(pool: SqlitePool) -> Self {
        SqliteIndexSink {
            pool,
            auto_commit: true,
        }
    }

    /// Number of committed documents.
    pub async fn committed_count(&self) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Number of documents waiting for a commit.
    pub async fn staged_count(&self) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM staged_documents")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Fetches a committed document's `(url, expanded_url, domain)`.
    pub async fn fetch_committed(
        &self,
        id: &str,
    ) -> Result<Option<(String, Option<String>, Option<String>)>, DatabaseError> {
        let row = sqlx::query("SELECT url, expanded_url, domain FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| (row.get("url"), row.get("expanded_url"), row.get("domain"))))
    }

    async fn upsert(&self, table: &str, document: &IndexDocument) -> Result<(), DatabaseError> {
        let time_column = if table == "documents" {
            "committed_at_ms"
        } else {
            "staged_at_ms"
        };
        let body = serde_json::to_string(&document.body)?;
        sqlx::query(&format!(
            "INSERT INTO {table} (id, url, expanded_url, domain, body, {time_column})
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                url = excluded.url,
                expanded_url = excluded.expanded_url,
                domain = excluded.domain,
                body = excluded.body,
                {time_column} = excluded.{time_column}"
        ))
        .bind(&document.id)
        .bind(&document.url)
        .bind(&document.expanded_url)
        .bind(&document.domain)
        .bind(body)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn publish_staged(&self) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let published = sqlx::query(
            "INSERT INTO documents (id, url, expanded_url, domain, body, committed_at_ms)
             SELECT id, url, expanded_url, domain, body, ?
             FROM staged_documents WHERE true
             ON CONFLICT(id) DO UPDATE SET
                url = excluded.url,
                expanded_url = excluded.expanded_url,
                domain = excluded.domain,
                body = excluded.body,
                committed_at_ms = excluded.committed_at_ms",
        )
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        sqlx::query("DELETE FROM staged_documents")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(published)
    }
}

#[async_trait]
impl DocumentSink for SqliteIndexSink {
    async fn add(&self, document: &IndexDocument) -> Result<(), SinkError> {
        let table = if self.auto_commit {
            "documents"
        } else {
            "staged_documents"
        };
        self.upsert(table, document)
            .await
            .map_err(|source| SinkError::Add {
                id: document.id.clone(),
                source,
            })
    }

    async fn commit(&self) -> Result<(), SinkError> {
        if self.auto_commit {
            return Ok(());
        }
        let published = self.publish_staged().await.map_err(SinkError::Commit)?;
        log::debug!("Committed {} staged document(s)", published);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;
    use crate::storage::test_helpers::create_test_pool;

    fn article(url: &str, expanded: &str, domain: &str) -> IndexDocument {
        let mut item = WorkItem::new(url);
        item.resolved(
            expanded.to_string(),
            domain.to_string(),
            Classification::Article,
        );
        IndexDocument::from_item(&item, domain).expect("serializable item")
    }

    #[tokio::test]
    async fn test_add_is_invisible_until_commit() {
        let sink = SqliteIndexSink::new(create_test_pool().await);
        sink.add(&article("http://a.com/1", "http://news.com/1", "news.com"))
            .await
            .expect("add");

        assert_eq!(sink.staged_count().await.expect("count"), 1);
        assert_eq!(sink.committed_count().await.expect("count"), 0);

        sink.commit().await.expect("commit");

        assert_eq!(sink.staged_count().await.expect("count"), 0);
        assert_eq!(sink.committed_count().await.expect("count"), 1);
        let (url, expanded, domain) = sink
            .fetch_committed("http://a.com/1")
            .await
            .expect("read")
            .expect("committed");
        assert_eq!(url, "http://a.com/1");
        assert_eq!(expanded.as_deref(), Some("http://news.com/1"));
        assert_eq!(domain.as_deref(), Some("news.com"));
    }

    #[tokio::test]
    async fn test_duplicate_adds_collapse_by_id() {
        let sink = SqliteIndexSink::new(create_test_pool().await);
        let doc = article("http://a.com/1", "http://news.com/1", "news.com");
        sink.add(&doc).await.expect("add");
        sink.commit().await.expect("commit");

        // Redelivery of an already committed item
        sink.add(&doc).await.expect("add again");
        sink.commit().await.expect("commit again");

        assert_eq!(sink.committed_count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_commit_with_nothing_staged() {
        let sink = SqliteIndexSink::new(create_test_pool().await);
        assert!(sink.commit().await.is_ok());
        assert_eq!(sink.committed_count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_auto_commit_writes_directly() {
        let sink = SqliteIndexSink::with_auto_commit(create_test_pool().await);
        sink.add(&article("http://a.com/1", "http://news.com/1", "news.com"))
            .await
            .expect("add");

        assert_eq!(sink.staged_count().await.expect("count"), 0);
        assert_eq!(sink.committed_count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_add_fails_when_tables_are_missing() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        let sink = SqliteIndexSink::new(pool);

        let result = sink
            .add(&article("http://a.com/1", "http://news.com/1", "news.com"))
            .await;
        assert!(matches!(result, Err(SinkError::Add { .. })));
        assert!(matches!(sink.commit().await, Err(SinkError::Commit(_))));
    }
}
