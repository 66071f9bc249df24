//! Per-execution fan-out of lifecycle notifications.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;

use a2a_types::Update;

/// One lifecycle notification with a fixed payload type per variant.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// Execution started; initial state has been loaded or created.
    Start { task_id: String },
    /// An update was accepted and reconciled into the task aggregate.
    Update(Update),
    /// Cancellation was observed; carries the update that was in flight.
    Cancel(Update),
    /// The execution failed; carries the rendered error message.
    Error(String),
    /// The execution finished — success, cancellation, or failure alike.
    Complete,
}

/// Receiver half of a lifecycle subscription.
pub type LifecycleReceiver = UnboundedReceiver<LifecycleEvent>;

/// Multiplexes [`LifecycleEvent`]s to any number of subscribers.
///
/// Closed subscribers are pruned on publish; publishing with no subscribers
/// is a no-op.
#[derive(Debug, Default)]
pub struct LifecycleBus {
    subscribers: RwLock<Vec<UnboundedSender<LifecycleEvent>>>,
}

impl LifecycleBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self) -> LifecycleReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.write().await.push(tx);
        rx
    }

    pub async fn publish(&self, event: &LifecycleEvent) {
        self.subscribers
            .write()
            .await
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}
