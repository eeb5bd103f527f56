//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for every failure the pipeline distinguishes
//! - Processing statistics tracking (errors and info metrics)
//! - Retry strategy configuration
//! - Categorization of HTTP client errors
//!
//! Counters are split into:
//! - **Errors**: failures that end in a failed delivery or a failure record
//! - **Info**: notable events (redirects, routing decisions, commits)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy};
pub use stats::ProcessingStats;
pub use types::{
    DatabaseError, EmitError, ErrorType, InfoType, InitializationError, ResolutionError,
    SinkError,
};
