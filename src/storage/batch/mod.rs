//! Batched commit controller.
//!
//! Per-item writes go to the sink immediately; only the acknowledgment is
//! deferred. Deliveries wait in a pending batch until the [`CommitStrategy`]
//! reports a commit boundary (or a tick forces one), and are then acked or
//! failed together depending on the commit result.

mod types;
mod writer;

pub use types::{BatchEvent, CommitStrategy};
pub use writer::{BatchCommitter, BatchCounters};
