//! Error type definitions.
//!
//! This module defines all error and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Error serializing a document for storage.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Reasons a redirect chain could not be resolved.
///
/// Timeouts are kept apart from other network errors so that counters and logs
/// can tell them apart, but every variant takes the same failure path.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// A hop did not answer within the per-hop timeout.
    #[error("Timed out resolving {url}")]
    Timeout {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// Connection, protocol or other transport failure.
    #[error("Network error resolving {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The URL (or a `Location` target) could not be parsed or has no host.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ResolutionError {
    /// The URL being probed when resolution failed.
    pub fn url(&self) -> &str {
        match self {
            ResolutionError::Timeout { url, .. }
            | ResolutionError::Network { url, .. }
            | ResolutionError::InvalidUrl { url, .. } => url,
        }
    }

    /// Counter category for this failure.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ResolutionError::Timeout { .. } => ErrorType::ResolutionTimeout,
            ResolutionError::Network { .. } => ErrorType::ResolutionFailure,
            ResolutionError::InvalidUrl { .. } => ErrorType::InvalidUrl,
        }
    }
}

/// Errors surfaced by a durable document sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing a single document failed.
    #[error("Failed to add document {id}: {source}")]
    Add {
        id: String,
        #[source]
        source: DatabaseError,
    },

    /// The commit (durability flush) failed.
    #[error("Commit failed: {0}")]
    Commit(#[source] DatabaseError),
}

/// Errors raised when forwarding an item to a downstream channel.
#[derive(Error, Debug)]
pub enum EmitError {
    /// The consumer side of the channel has gone away.
    #[error("Output stream '{0}' is closed")]
    ChannelClosed(&'static str),
}

/// Types of errors that can occur while expanding, routing or indexing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Resolution
    ResolutionFailure,
    ResolutionTimeout,
    InvalidUrl,
    // Input
    MalformedInput,
    // Persistence
    PersistenceFailure,
    // Routing
    EmitFailure,
    // Search index
    SinkAddFailure,
    CommitFailure,
}

/// Types of informational metrics recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    Redirected,
    HopLimitReached,
    MediaRouted,
    ArticleRouted,
    Redelivered,
    BatchCommitted,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ResolutionFailure => "Redirect resolution failure",
            ErrorType::ResolutionTimeout => "Redirect resolution timeout",
            ErrorType::InvalidUrl => "Invalid URL",
            ErrorType::MalformedInput => "Malformed input item",
            ErrorType::PersistenceFailure => "Status write failure",
            ErrorType::EmitFailure => "Emit failure",
            ErrorType::SinkAddFailure => "Search index add failure",
            ErrorType::CommitFailure => "Search index commit failure",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::Redirected => "Redirected",
            InfoType::HopLimitReached => "Redirect hop limit reached",
            InfoType::MediaRouted => "Routed to media",
            InfoType::ArticleRouted => "Routed to webpages",
            InfoType::Redelivered => "Redelivered",
            InfoType::BatchCommitted => "Batches committed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        assert_eq!(
            ErrorType::ResolutionTimeout.as_str(),
            "Redirect resolution timeout"
        );
        assert_eq!(
            ErrorType::CommitFailure.as_str(),
            "Search index commit failure"
        );
    }

    #[test]
    fn test_all_error_types_have_string_representation() {
        for error_type in ErrorType::iter() {
            let str_repr = error_type.as_str();
            assert!(
                !str_repr.is_empty(),
                "{:?} should have non-empty string",
                error_type
            );
        }
    }

    #[test]
    fn test_all_info_types_have_string_representation() {
        for info_type in InfoType::iter() {
            assert!(!info_type.as_str().is_empty());
        }
    }

    #[test]
    fn test_invalid_url_error_maps_to_counter() {
        let error = ResolutionError::InvalidUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(error.error_type(), ErrorType::InvalidUrl);
        assert_eq!(error.url(), "not a url");
        assert!(error.to_string().contains("not a url"));
    }
}
