//! Round-robin dispatch with redelivery.
//!
//! Stands in for the host runtime: every item gets a delivery handle, items
//! are spread over worker queues, and a failed delivery is handed out again up
//! to `max_redeliveries` times.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;

use crate::config::DRAIN_FLUSH_INTERVAL;
use crate::delivery::{DeliveryOutcome, Envelope};
use crate::error_handling::{InfoType, ProcessingStats};
use crate::pipeline::WorkerMessage;

/// Totals for one dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub dispatched: usize,
    pub acked: usize,
    pub failed: usize,
    pub redelivered: usize,
}

struct InFlight<T> {
    id: u64,
    payload: T,
    attempt: u32,
}

type Settled<T> = BoxFuture<'static, (InFlight<T>, DeliveryOutcome)>;

pub struct Dispatcher<T> {
    name: &'static str,
    workers: Vec<mpsc::Sender<WorkerMessage<T>>>,
    max_redeliveries: u32,
    stats: Arc<ProcessingStats>,
    completed: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    next_id: u64,
    report: DispatchReport,
}

impl<T: Clone + Send + 'static> Dispatcher<T> {
    pub fn new(
        name: &'static str,
        workers: Vec<mpsc::Sender<WorkerMessage<T>>>,
        max_redeliveries: u32,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Dispatcher {
            name,
            workers,
            max_redeliveries,
            stats,
            completed: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            next_id: 0,
            report: DispatchReport::default(),
        }
    }

    /// Shares the final ack/fail counters, for progress logging.
    pub fn with_progress(mut self, completed: Arc<AtomicUsize>, failed: Arc<AtomicUsize>) -> Self {
        self.completed = completed;
        self.failed = failed;
        self
    }

    /// Dispatches everything from `input` and waits until every item is settled.
    ///
    /// Worker queues are closed when this returns.
    pub async fn run(mut self, mut input: mpsc::Receiver<T>) -> DispatchReport {
        if self.workers.is_empty() {
            log::error!("{} dispatcher has no workers", self.name);
            return self.report;
        }

        let mut outstanding: FuturesUnordered<Settled<T>> = FuturesUnordered::new();
        let mut input_open = true;

        loop {
            if !input_open && outstanding.is_empty() {
                break;
            }
            tokio::select! {
                received = input.recv(), if input_open => match received {
                    Some(payload) => {
                        self.next_id += 1;
                        self.report.dispatched += 1;
                        let flight = InFlight { id: self.next_id, payload, attempt: 0 };
                        if let Some(settled) = self.send(flight).await {
                            outstanding.push(settled);
                        }
                    }
                    None => {
                        input_open = false;
                        self.flush_all().await;
                    }
                },
                Some((flight, outcome)) = outstanding.next(), if !outstanding.is_empty() => {
                    if let Some(settled) = self.settle(flight, outcome).await {
                        outstanding.push(settled);
                    }
                }
                _ = tokio::time::sleep(DRAIN_FLUSH_INTERVAL), if !input_open => {
                    self.flush_all().await;
                }
            }
        }

        log::debug!(
            "{} dispatcher done: {} dispatched, {} acked, {} failed, {} redelivered",
            self.name,
            self.report.dispatched,
            self.report.acked,
            self.report.failed,
            self.report.redelivered
        );
        self.report
    }

    async fn send(&mut self, flight: InFlight<T>) -> Option<Settled<T>> {
        let slot = (flight.id as usize + flight.attempt as usize) % self.workers.len();
        let (envelope, receipt) = Envelope::tracked(flight.id, flight.payload.clone());
        if self.workers[slot]
            .send(WorkerMessage::Item(envelope))
            .await
            .is_err()
        {
            log::error!("{} worker {} is gone, item {} lost", self.name, slot, flight.id);
            self.record_failed();
            return None;
        }
        Some(
            async move {
                let outcome = receipt.outcome().await;
                (flight, outcome)
            }
            .boxed(),
        )
    }

    async fn settle(&mut self, mut flight: InFlight<T>, outcome: DeliveryOutcome) -> Option<Settled<T>> {
        match outcome {
            DeliveryOutcome::Acked => {
                self.report.acked += 1;
                self.completed.fetch_add(1, Ordering::SeqCst);
                None
            }
            DeliveryOutcome::Failed if flight.attempt < self.max_redeliveries => {
                flight.attempt += 1;
                log::debug!(
                    "Redelivering {} item {} (attempt {})",
                    self.name,
                    flight.id,
                    flight.attempt + 1
                );
                self.report.redelivered += 1;
                self.stats.increment_info(InfoType::Redelivered);
                self.send(flight).await
            }
            DeliveryOutcome::Failed => {
                log::warn!(
                    "Giving up on {} item {} after {} redeliveries",
                    self.name,
                    flight.id,
                    flight.attempt
                );
                self.record_failed();
                None
            }
        }
    }

    fn record_failed(&mut self) {
        self.report.failed += 1;
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Asks every worker to resolve what it is holding.
    async fn flush_all(&self) {
        for worker in &self.workers {
            let _ = worker.send(WorkerMessage::Flush).await;
        }
    }
}
