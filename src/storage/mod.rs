// storage/mod.rs
// Database operations module

pub mod batch;
pub mod index;
pub mod migrations;
pub mod pool;
pub mod status;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use batch::{BatchCommitter, BatchCounters, BatchEvent, CommitStrategy};
pub use index::{DocumentSink, IndexDocument, SqliteIndexSink};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use status::{SqliteStatusStore, StatusRecord, StatusRecorder, StatusStore};
