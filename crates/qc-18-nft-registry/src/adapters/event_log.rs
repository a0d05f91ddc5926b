//! # In-Memory Event Log
//!
//! Append-only record of every event the registry emitted, with live fan-out
//! over `tokio::sync::broadcast` for subscribers.

use crate::events::{LoggedEvent, RegistryEvent};
use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Maximum events buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// In-memory event sink.
pub struct InMemoryEventLog {
    /// Every event in publication order.
    log: RwLock<Vec<LoggedEvent>>,
    /// Live subscribers.
    sender: broadcast::Sender<LoggedEvent>,
    /// Total events recorded.
    events_published: AtomicU64,
}

impl InMemoryEventLog {
    /// Create an empty log with default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an empty log with the given channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            log: RwLock::new(Vec::new()),
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// Receive events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LoggedEvent> {
        self.sender.subscribe()
    }

    /// Snapshot of the full log.
    #[must_use]
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events with the given name (see [`crate::events::topics`]).
    #[must_use]
    pub fn events_named(&self, name: &str) -> Vec<LoggedEvent> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|logged| logged.event.name() == name)
            .cloned()
            .collect()
    }

    /// Events emitted by one call.
    #[must_use]
    pub fn events_for(&self, correlation_id: Uuid) -> Vec<LoggedEvent> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|logged| logged.correlation_id == correlation_id)
            .cloned()
            .collect()
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn publish(&self, correlation_id: Uuid, events: &[RegistryEvent]) -> Vec<LoggedEvent> {
        let logged: Vec<LoggedEvent> = {
            let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
            let logged: Vec<LoggedEvent> = events
                .iter()
                .cloned()
                .enumerate()
                .map(|(offset, event)| LoggedEvent {
                    sequence: (log.len() + offset) as u64,
                    correlation_id,
                    event,
                })
                .collect();
            log.extend(logged.iter().cloned());
            logged
        };

        self.events_published
            .fetch_add(logged.len() as u64, Ordering::Relaxed);

        for entry in &logged {
            // No receivers is fine; the log keeps the event.
            let receivers = self.sender.send(entry.clone()).unwrap_or(0);
            debug!(
                event = entry.event.name(),
                sequence = entry.sequence,
                receivers,
                "Event logged"
            );
        }

        logged
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Address, TokenId};
    use crate::events::topics;

    fn whitelist_event(byte: u8) -> RegistryEvent {
        RegistryEvent::WhiteListUpdated {
            account: Address::new([byte; 20]),
            status: true,
        }
    }

    #[tokio::test]
    async fn test_publish_assigns_sequences() {
        let log = InMemoryEventLog::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let a = log.publish(first, &[whitelist_event(1), whitelist_event(2)]).await;
        let b = log.publish(second, &[whitelist_event(3)]).await;

        assert_eq!(a[0].sequence, 0);
        assert_eq!(a[1].sequence, 1);
        assert_eq!(b[0].sequence, 2);
        assert_eq!(log.events_published(), 3);
        assert_eq!(log.events_for(first).len(), 2);
        assert_eq!(log.events_for(second).len(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_keeps_log() {
        let log = InMemoryEventLog::new();
        assert_eq!(log.subscriber_count(), 0);
        log.publish(Uuid::new_v4(), &[whitelist_event(1)]).await;
        assert_eq!(log.events().len(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let log = InMemoryEventLog::new();
        let mut rx = log.subscribe();
        assert_eq!(log.subscriber_count(), 1);

        let id = Uuid::new_v4();
        let mint = RegistryEvent::Transfer {
            from: Address::ZERO,
            to: Address::new([2u8; 20]),
            token_id: TokenId::one(),
        };
        log.publish(id, &[mint.clone()]).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, mint);
        assert_eq!(received.correlation_id, id);
    }

    #[tokio::test]
    async fn test_events_named() {
        let log = InMemoryEventLog::new();
        log.publish(
            Uuid::new_v4(),
            &[
                whitelist_event(1),
                RegistryEvent::BlackListUpdated {
                    account: Address::new([1u8; 20]),
                    status: true,
                },
            ],
        )
        .await;

        assert_eq!(log.events_named(topics::WHITE_LIST_UPDATED).len(), 1);
        assert_eq!(log.events_named(topics::BLACK_LIST_UPDATED).len(), 1);
        assert!(log.events_named(topics::TRANSFER).is_empty());
    }
}
