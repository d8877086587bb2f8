use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// Domain events emitted after a transaction is durable. Consumers are
/// best-effort: a lost event never rolls back the write that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PaymentOrderCreated(i64),
    PaymentOrderApproved(i64),
    PaymentOrderRejected {
        payment_order_id: i64,
        by_email: bool,
    },
    PaymentOrderCancellationRequested(i64),
    PaymentOrderCancellationApproved(i64),
    PaymentOrderCancellationRejected(i64),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drain the event channel, logging each event. The thin HTTP layer (or a
/// worker binary) spawns this next to the services.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "processing domain event");
    }
}
