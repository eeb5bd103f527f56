//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::config::constants::*;
use crate::storage::batch::CommitStrategy;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Pipeline configuration.
///
/// Parsed from the command line by the binary, or built programmatically with
/// struct-update syntax over `Config::default()`.
///
/// # Examples
///
/// ```no_run
/// use url_expander::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: PathBuf::from("urls.txt"),
///     commit_threshold: Some(100),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "url_expander", version, about)]
pub struct Config {
    /// File to read items from (one URL or JSON object per line, `-` for stdin)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, env = "URL_EXPANDER_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Maximum redirect hops followed per URL
    #[arg(long, default_value_t = MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Per-hop request timeout in milliseconds
    #[arg(long, default_value_t = HOP_TIMEOUT_MS)]
    pub hop_timeout_ms: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Host routed to the media channel (repeatable, replaces the built-in list)
    #[arg(long = "media-host", value_name = "HOST")]
    pub media_hosts: Vec<String>,

    /// File with one media host per line (merged with --media-host)
    #[arg(long)]
    pub media_hosts_file: Option<PathBuf>,

    /// Number of independent expander workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Bounded queue size per worker
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Commit the search index after this many documents
    #[arg(long)]
    pub commit_threshold: Option<usize>,

    /// Commit the search index at least this often (seconds)
    #[arg(long)]
    pub commit_interval_secs: Option<u64>,

    /// Forced-commit tick for the count-based strategy (seconds)
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_SECS)]
    pub tick_interval_secs: u64,

    /// Fail (and redeliver) items whose redirect chain cannot be resolved
    #[arg(long)]
    pub fail_unresolved: bool,

    /// Times a failed item is handed back to a worker before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_REDELIVERIES)]
    pub max_redeliveries: u32,

    /// Append media channel items to this JSONL file instead of logging them
    #[arg(long)]
    pub media_out: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("urls.txt"),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            max_redirects: MAX_REDIRECTS,
            hop_timeout_ms: HOP_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            media_hosts: Vec::new(),
            media_hosts_file: None,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            commit_threshold: None,
            commit_interval_secs: None,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            fail_unresolved: false,
            max_redeliveries: DEFAULT_MAX_REDELIVERIES,
            media_out: None,
        }
    }
}

impl Config {
    /// Per-hop timeout as a `Duration`.
    pub fn hop_timeout(&self) -> Duration {
        Duration::from_millis(self.hop_timeout_ms)
    }

    /// Builds the commit strategy from the threshold/interval options.
    ///
    /// - neither set: `None` (ack after every write)
    /// - threshold only: `CountBased`, with `tick_interval_secs` as the forced-flush tick
    /// - interval set: `TimerBased`, optionally composed with the threshold
    pub fn commit_strategy(&self) -> CommitStrategy {
        match (self.commit_threshold, self.commit_interval_secs) {
            (None, None) => CommitStrategy::None,
            (Some(threshold), None) => CommitStrategy::CountBased {
                threshold: threshold.max(1),
                tick: Duration::from_secs(self.tick_interval_secs.max(1)),
            },
            (threshold, Some(secs)) => CommitStrategy::TimerBased {
                interval: Duration::from_secs(secs.max(1)),
                threshold: threshold.map(|t| t.max(1)),
            },
        }
    }

    /// Resolves the media host set.
    ///
    /// Hosts from `--media-host` and `--media-hosts-file` are merged; when both are
    /// empty the built-in list is used.
    pub fn media_hosts(&self) -> Result<BTreeSet<String>> {
        let mut hosts: BTreeSet<String> = self.media_hosts.iter().cloned().collect();
        if let Some(path) = &self.media_hosts_file {
            hosts.extend(read_host_file(path)?);
        }
        if hosts.is_empty() {
            hosts.extend(DEFAULT_MEDIA_HOSTS.iter().map(|h| h.to_string()));
        }
        Ok(hosts)
    }
}

fn read_host_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read media hosts file {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
