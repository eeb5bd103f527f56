//! Delivery handles: the ack/fail signal returned to whoever produced an item.
//!
//! A [`Delivery`] is consumed by [`Delivery::ack`] or [`Delivery::fail`], so an
//! item can be resolved at most once. A handle dropped without either is
//! reported to its producer as failed, which makes a lost item show up as a
//! redelivery instead of disappearing.

use tokio::sync::oneshot;

/// Final state of a delivery as seen by its producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Acked,
    Failed,
}

/// Consumer-side handle for one delivered item.
#[derive(Debug)]
pub struct Delivery {
    id: u64,
    reply: Option<oneshot::Sender<DeliveryOutcome>>,
}

/// Producer-side view of a delivery.
#[derive(Debug)]
pub struct DeliveryReceipt {
    id: u64,
    rx: oneshot::Receiver<DeliveryOutcome>,
}

impl Delivery {
    /// Creates a linked handle/receipt pair.
    pub fn channel(id: u64) -> (Delivery, DeliveryReceipt) {
        let (tx, rx) = oneshot::channel();
        (
            Delivery {
                id,
                reply: Some(tx),
            },
            DeliveryReceipt { id, rx },
        )
    }

    /// A handle nobody waits on.
    pub fn detached(id: u64) -> Delivery {
        Delivery { id, reply: None }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Acknowledges the item: it has been fully processed.
    pub fn ack(mut self) {
        self.resolve(DeliveryOutcome::Acked);
    }

    /// Fails the item: the producer should redeliver it.
    pub fn fail(mut self) {
        self.resolve(DeliveryOutcome::Failed);
    }

    fn resolve(&mut self, outcome: DeliveryOutcome) {
        if let Some(reply) = self.reply.take() {
            // The producer may have stopped listening; nothing left to tell it
            let _ = reply.send(outcome);
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if self.reply.is_some() {
            log::warn!(
                "Delivery {} dropped without ack or fail; reporting it as failed",
                self.id
            );
            self.resolve(DeliveryOutcome::Failed);
        }
    }
}

impl DeliveryReceipt {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the consumer's verdict.
    pub async fn outcome(self) -> DeliveryOutcome {
        self.rx.await.unwrap_or(DeliveryOutcome::Failed)
    }
}

/// An item paired with the handle that resolves it.
#[derive(Debug)]
pub struct Envelope<T> {
    pub payload: T,
    pub delivery: Delivery,
}

impl<T> Envelope<T> {
    /// Wraps `payload` with a fresh delivery handle, returning the receipt.
    pub fn tracked(id: u64, payload: T) -> (Self, DeliveryReceipt) {
        let (delivery, receipt) = Delivery::channel(id);
        (Envelope { payload, delivery }, receipt)
    }
}
