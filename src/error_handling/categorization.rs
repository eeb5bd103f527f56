//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize errors and configure retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::ResolutionError;

/// Creates an exponential backoff retry strategy for status writes.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
///
/// The iterator is ready for use with `tokio_retry::Retry`.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `reqwest::Error` raised while probing `url`.
///
/// Timeouts become `ResolutionError::Timeout`, builder errors (an unusable URL)
/// become `InvalidUrl`, and everything else is a `Network` failure.
pub fn categorize_reqwest_error(url: &str, error: reqwest::Error) -> ResolutionError {
    if error.is_timeout() {
        ResolutionError::Timeout {
            url: url.to_string(),
            source: error,
        }
    } else if error.is_builder() {
        ResolutionError::InvalidUrl {
            url: url.to_string(),
            reason: error.to_string(),
        }
    } else {
        ResolutionError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}
