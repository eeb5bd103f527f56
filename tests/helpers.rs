// Shared test helpers for database setup and input files.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::path::{Path, PathBuf};

use sqlx::{Row, SqlitePool};
use tempfile::NamedTempFile;

use url_expander::{run_migrations, Config, LogFormat, LogLevel};

/// Writes one input item per line to a temporary file.
#[allow(dead_code)]
pub fn write_input(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write line");
    }
    file.flush().expect("Failed to flush file");
    file
}

/// Config for pipeline tests: quiet logging, a single worker and short ticks.
#[allow(dead_code)]
pub fn test_config(input: &Path, db_path: &Path) -> Config {
    Config {
        file: input.to_path_buf(),
        log_level: LogLevel::Error,
        log_format: LogFormat::Plain,
        db_path: db_path.to_path_buf(),
        user_agent: "url_expander_test/1.0".to_string(),
        workers: 1,
        tick_interval_secs: 1,
        ..Default::default()
    }
}

/// Opens an existing database file, running migrations if it is new.
#[allow(dead_code)]
pub async fn create_test_pool_with_path(db_path: &PathBuf) -> SqlitePool {
    std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .read(true)
        .open(db_path)
        .expect("Failed to create/open database file");

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path.to_string_lossy()))
        .await
        .expect("Failed to create test database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Reads `(expanded_url, domain, status)` for `url`.
#[allow(dead_code)]
pub async fn fetch_status(
    pool: &SqlitePool,
    url: &str,
) -> Option<(Option<String>, Option<String>, Option<String>)> {
    sqlx::query("SELECT expanded_url, domain, status FROM url_status WHERE url = ?")
        .bind(url)
        .fetch_optional(pool)
        .await
        .expect("Failed to query url_status")
        .map(|row| (row.get("expanded_url"), row.get("domain"), row.get("status")))
}

#[allow(dead_code)]
pub async fn count_documents(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await
        .expect("Failed to count documents")
}
