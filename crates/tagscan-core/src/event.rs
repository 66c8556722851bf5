//! Scan notifications.
//!
//! Views subscribe to a `tokio::sync::broadcast` channel and refresh when the
//! cache changes. Events are values; a subscriber that falls behind loses the
//! oldest ones and is told how many.

use std::path::PathBuf;

use crate::document::DocumentId;
use tokio::sync::broadcast;

/// Events emitted by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A document was scanned and its cache entry replaced
    DocumentScanned { id: DocumentId, count: usize },
    /// One cache entry was dropped
    CacheInvalidated(DocumentId),
    /// Every cache entry was dropped
    CacheCleared,
    /// The active tag list changed
    TagsConfigured { active: usize, rejected: usize },
    /// A file was skipped during a batch scan
    FileSkipped { path: PathBuf, reason: String },
    /// A batch scan finished
    BatchFinished { scanned: usize, skipped: usize },
}

/// Broadcast bus for scan events.
///
/// Cloning the bus shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ScanEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: ScanEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for consuming events in a task.
///
/// ```ignore
/// let mut handler = EventHandler::new(scanner.subscribe());
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let ScanEvent::DocumentScanned { .. } = event {
///             // refresh the list view
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<ScanEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<ScanEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event; `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<ScanEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(ScanEvent::CacheCleared);

        assert_eq!(rx.recv().await.unwrap(), ScanEvent::CacheCleared);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();

        bus.emit(ScanEvent::TagsConfigured { active: 3, rejected: 0 });

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(ScanEvent::CacheInvalidated(DocumentId::new("a.rs")));
        drop(bus);

        assert_eq!(
            handler.next().await,
            Some(ScanEvent::CacheInvalidated(DocumentId::new("a.rs")))
        );
        assert_eq!(handler.next().await, None);
    }
}
