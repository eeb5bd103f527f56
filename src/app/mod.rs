//! Main application modules.
//!
//! Input reading, dispatch to workers, the media consumer, progress logging,
//! shutdown handling and statistics printing used by `run_pipeline`.

pub mod dispatch;
pub mod input;
pub mod logging;
pub mod media;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use dispatch::Dispatcher;
pub use input::{open_input, read_input};
pub use logging::log_progress;
pub use media::consume_media;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_run_summary};
