//! Commit strategy and controller events.

use std::time::Duration;

/// Policy deciding when pending deliveries are committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStrategy {
    /// No batching: each item is acked right after its own write.
    None,
    /// Commit once `threshold` items are pending. `tick` is the forced-flush
    /// backstop for low traffic.
    CountBased { threshold: usize, tick: Duration },
    /// Commit every `interval`, and earlier if `threshold` items are pending.
    TimerBased {
        interval: Duration,
        threshold: Option<usize>,
    },
}

impl CommitStrategy {
    /// Whether a commit boundary has been reached.
    pub fn should_commit(&self, pending: usize, since_last_flush: Duration) -> bool {
        match self {
            CommitStrategy::None => pending > 0,
            CommitStrategy::CountBased { threshold, .. } => pending >= *threshold,
            CommitStrategy::TimerBased {
                interval,
                threshold,
            } => {
                pending > 0
                    && (since_last_flush >= *interval
                        || threshold.is_some_and(|t| pending >= t))
            }
        }
    }

    /// Cadence of the forced-commit tick, if the strategy batches at all.
    pub fn tick_interval(&self) -> Option<Duration> {
        match self {
            CommitStrategy::None => None,
            CommitStrategy::CountBased { tick, .. } => Some(*tick),
            CommitStrategy::TimerBased { interval, .. } => Some(*interval),
        }
    }

    pub fn is_batching(&self) -> bool {
        !matches!(self, CommitStrategy::None)
    }

    /// Expected upper bound on the pending batch, used to size the buffer.
    pub fn capacity(&self) -> usize {
        match self {
            CommitStrategy::None => 0,
            CommitStrategy::CountBased { threshold, .. } => *threshold,
            CommitStrategy::TimerBased { threshold, .. } => {
                threshold.unwrap_or(crate::config::DEFAULT_BATCH_CAPACITY)
            }
        }
    }
}

/// What a controller call did with the deliveries it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEvent {
    /// Written and acked at once (`None` strategy).
    Acked,
    /// Written; acknowledgment deferred.
    Buffered { pending: usize },
    /// Commit succeeded; `acked` deliveries acknowledged.
    Committed { acked: usize },
    /// Commit failed; `failed` deliveries failed.
    CommitFailed { failed: usize },
    /// The item's write failed; it and every pending delivery were failed.
    WriteFailed { failed: usize },
    /// Nothing pending.
    Idle,
}
