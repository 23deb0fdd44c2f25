use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::EditorEvent;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<EditorEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity, at least 1.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(
        &self,
        event: EditorEvent,
    ) -> Result<usize, broadcast::error::SendError<EditorEvent>> {
        self.sender.send(event)
    }

    /// Publish, ignoring the absence of subscribers.
    pub fn emit(&self, event: EditorEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
