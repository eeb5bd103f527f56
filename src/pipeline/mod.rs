//! Stage interface and worker loop.
//!
//! A [`Stage`] processes one item at a time and may react to periodic ticks.
//! [`run_worker`] drives a stage from a bounded channel; ticks are delivered on
//! the same task, so a stage never sees two calls at once.

mod expander;
mod index;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use crate::delivery::Envelope;

pub use expander::ExpanderStage;
pub use index::IndexStage;

/// How a stage resolved an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Acked,
    Failed,
    /// Acknowledgment deferred (buffered for a later commit).
    Deferred,
}

/// Messages accepted by a worker.
#[derive(Debug)]
pub enum WorkerMessage<T> {
    Item(Envelope<T>),
    /// Run `on_tick` now, outside the regular cadence.
    Flush,
}

#[async_trait]
pub trait Stage: Send {
    type Input: Send + 'static;

    fn name(&self) -> &'static str;

    /// Processes one item. The stage owns the item's delivery and must ack,
    /// fail, or hold it.
    async fn process_item(&mut self, envelope: Envelope<Self::Input>) -> Outcome;

    /// Periodic callback.
    async fn on_tick(&mut self) {}

    /// Called once after the input channel closes.
    async fn finish(&mut self) {}

    /// Tick cadence; `None` disables ticks.
    fn tick_interval(&self) -> Option<Duration> {
        None
    }
}

/// Per-worker tallies of item outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTally {
    pub acked: usize,
    pub failed: usize,
    pub deferred: usize,
}

impl WorkerTally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Acked => self.acked += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Deferred => self.deferred += 1,
        }
    }
}

/// Runs `stage` until `rx` closes, then calls `finish` and hands the stage back.
pub async fn run_worker<S: Stage>(
    mut stage: S,
    mut rx: mpsc::Receiver<WorkerMessage<S::Input>>,
) -> (S, WorkerTally) {
    let mut ticker = stage.tick_interval().map(|period| {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut tally = WorkerTally::default();

    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(WorkerMessage::Item(envelope)) => {
                    tally.record(stage.process_item(envelope).await);
                }
                Some(WorkerMessage::Flush) => stage.on_tick().await,
                None => break,
            },
            _ = next_tick(&mut ticker) => stage.on_tick().await,
        }
    }

    stage.finish().await;
    log::debug!(
        "{} worker stopped: {} acked, {} failed, {} deferred",
        stage.name(),
        tally.acked,
        tally.failed,
        tally.deferred
    );
    (stage, tally)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
