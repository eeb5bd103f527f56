//! Configuration constants.
//!
//! This module defines the defaults used throughout the application: resolver
//! tunables, commit cadence, worker sizing and retry timings.

use std::time::Duration;

pub const DB_PATH: &str = "./url_expander.db";
pub const LOGGING_INTERVAL: Duration = Duration::from_secs(5);

// Redirect resolution
/// Maximum number of redirect hops to follow before accepting the current URL
/// as canonical. Worst-case resolution latency is `MAX_REDIRECTS * HOP_TIMEOUT_MS`.
pub const MAX_REDIRECTS: usize = 3;
/// Per-hop request timeout in milliseconds
pub const HOP_TIMEOUT_MS: u64 = 1000;

/// Default User-Agent string for redirect probes.
///
/// Some shorteners answer bare clients with an interstitial page instead of a
/// redirect, so the probe identifies as a regular browser.
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Routing
/// Hosts routed to the `mediaitems` channel when no host list is configured.
pub const DEFAULT_MEDIA_HOSTS: &[&str] = &[
    "vimeo.com",
    "instagram.com",
    "www.youtube.com",
    "twitpic.com",
    "dailymotion.com",
    "www.facebook.com",
];
/// Output stream carrying media items: `{item}`
pub const MEDIA_STREAM: &str = "mediaitems";
/// Output stream carrying web pages: `{item, domain}`
pub const WEBPAGE_STREAM: &str = "webpages";
/// Status value written when resolution fails. Success is implied by `expanded_url`.
pub const STATUS_FAILED: &str = "failed";

// Batched commits
/// Forced commit cadence in seconds for the count-based strategy.
/// Half of a typical 30s redelivery timeout, so a tick always lands before the
/// producer gives up on an unacknowledged item.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 15;
/// Initial pending-batch capacity when the strategy has no count threshold
pub const DEFAULT_BATCH_CAPACITY: usize = 10;

// Workers
/// Number of independent expander workers
pub const DEFAULT_WORKERS: usize = 4;
/// Bounded queue size per worker
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Number of times a failed delivery is handed back to a worker
pub const DEFAULT_MAX_REDELIVERIES: u32 = 2;
/// Once input is exhausted, how long the dispatcher waits for outstanding
/// deliveries before asking workers to flush their pending batches
pub const DRAIN_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

// Retry strategy (status writes)
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 50;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 2;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;
