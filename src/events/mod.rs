//! Event broadcasting for shopping-list change notifications.
//!
//! Services publish events describing what changed, and connected clients
//! (or any other subscriber) receive them to stay in sync.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ Services / jobs │────>│    EventBus     │────>│   Subscribers   │
//! │ (retention)     │     │  (broadcast)    │     │                 │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! // Publishing an event for one group
//! let publisher = GroupEventPublisher::new(event_bus.clone(), group_id);
//! publisher.publish_event(EventType::ShoppingListUpdated, data);
//!
//! // Subscribing to events
//! let mut rx = event_bus.subscribe();
//! while let Ok(event) = rx.recv().await {
//!     // Handle event
//! }
//! ```

mod publisher;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
pub use publisher::{GroupEventPublisher, publish_list_item_events};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default channel capacity for the event bus.
/// This determines how many events can be buffered before slow receivers
/// start missing events (lagging).
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Integration id used for events raised by the system itself rather than
/// by a user-facing integration.
pub const DEFAULT_INTEGRATION_ID: &str = "generic";

/// Kinds of events that can be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ShoppingListCreated,
    ShoppingListUpdated,
    ShoppingListDeleted,
}

impl EventType {
    /// Get the event type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ShoppingListCreated => "shopping_list_created",
            EventType::ShoppingListUpdated => "shopping_list_updated",
            EventType::ShoppingListDeleted => "shopping_list_deleted",
        }
    }
}

/// What happened to the document an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOperation {
    Info,
    Create,
    Update,
    Delete,
}

/// Payload describing the document an event refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "document_type", rename_all = "snake_case")]
pub enum EventDocumentData {
    /// A shopping list, or some of its items, changed.
    ShoppingList {
        operation: EventOperation,
        shopping_list_id: Uuid,
        /// Items affected by the change. Empty when the list itself changed.
        #[serde(default)]
        shopping_list_item_ids: Vec<Uuid>,
    },
}

impl EventDocumentData {
    pub fn operation(&self) -> EventOperation {
        match self {
            EventDocumentData::ShoppingList { operation, .. } => *operation,
        }
    }
}

/// An event as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub integration_id: String,
    pub group_id: Uuid,
    pub event_type: EventType,
    pub document_data: EventDocumentData,
    /// Optional human-readable message. Empty when not provided.
    #[serde(default)]
    pub message: String,
}

impl Event {
    /// Whether this event belongs to the given group.
    pub fn is_for_group(&self, group_id: Uuid) -> bool {
        self.group_id == group_id
    }
}

/// Central event bus for broadcasting events.
///
/// Uses a tokio broadcast channel to allow multiple subscribers to receive
/// the same events. Events are cloned for each subscriber.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    /// Counter for total events published (for metrics)
    events_published: AtomicU64,
    /// Counter for events dropped due to no subscribers
    events_dropped: AtomicU64,
}

impl EventBus {
    /// Create a new event bus with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with a custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
        }
    }

    /// Build an event from its parts and publish it.
    ///
    /// Delivery happens on the subscribers' side; the caller never waits on
    /// them.
    pub fn dispatch(
        &self,
        integration_id: &str,
        group_id: Uuid,
        event_type: EventType,
        document_data: EventDocumentData,
        message: impl Into<String>,
    ) -> usize {
        let event = Event {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            integration_id: integration_id.to_string(),
            group_id,
            event_type,
            document_data,
            message: message.into(),
        };

        tracing::trace!(
            event_id = %event.id,
            group_id = %group_id,
            event_type = event_type.as_str(),
            "Dispatching event"
        );

        self.publish(event)
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// If there are no subscribers, the event is dropped and 0 is returned.
    pub fn publish(&self, event: Event) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                // No active subscribers, event is dropped
                self.events_dropped.fetch_add(1, Ordering::Relaxed);
                0
            }
        }
    }

    /// Subscribe to events from this bus.
    ///
    /// If the receiver falls behind, it will receive `RecvError::Lagged`
    /// indicating how many events were missed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the total number of events published.
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Get the number of events dropped (no subscribers).
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        // Clone shares the same underlying broadcast channel
        Self {
            sender: self.sender.clone(),
            events_published: AtomicU64::new(self.events_published.load(Ordering::Relaxed)),
            events_dropped: AtomicU64::new(self.events_dropped.load(Ordering::Relaxed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_data(operation: EventOperation) -> EventDocumentData {
        EventDocumentData::ShoppingList {
            operation,
            shopping_list_id: Uuid::new_v4(),
            shopping_list_item_ids: vec![Uuid::new_v4()],
        }
    }

    #[test]
    fn test_event_bus_new() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.events_published(), 0);
        assert_eq!(bus.events_dropped(), 0);
    }

    #[test]
    fn test_event_bus_dispatch_no_subscribers() {
        let bus = EventBus::new();

        let count = bus.dispatch(
            DEFAULT_INTEGRATION_ID,
            Uuid::new_v4(),
            EventType::ShoppingListUpdated,
            list_data(EventOperation::Delete),
            "",
        );
        assert_eq!(count, 0);
        assert_eq!(bus.events_published(), 1);
        assert_eq!(bus.events_dropped(), 1);
    }

    #[tokio::test]
    async fn test_event_bus_dispatch_and_receive() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let group_id = Uuid::new_v4();

        let data = list_data(EventOperation::Delete);
        let count = bus.dispatch(
            DEFAULT_INTEGRATION_ID,
            group_id,
            EventType::ShoppingListUpdated,
            data.clone(),
            "pruned",
        );
        assert_eq!(count, 1);
        assert_eq!(bus.events_dropped(), 0);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.integration_id, "generic");
        assert_eq!(received.group_id, group_id);
        assert_eq!(received.event_type, EventType::ShoppingListUpdated);
        assert_eq!(received.document_data, data);
        assert_eq!(received.message, "pruned");
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let mut rx3 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 3);

        let count = bus.dispatch(
            DEFAULT_INTEGRATION_ID,
            Uuid::new_v4(),
            EventType::ShoppingListCreated,
            list_data(EventOperation::Create),
            "",
        );
        assert_eq!(count, 3);

        // All subscribers should receive the event
        let r1 = rx1.recv().await.unwrap();
        let r2 = rx2.recv().await.unwrap();
        let r3 = rx3.recv().await.unwrap();

        assert_eq!(r1.id, r2.id);
        assert_eq!(r2.id, r3.id);
        assert_eq!(r1.event_type, EventType::ShoppingListCreated);
    }

    #[tokio::test]
    async fn test_event_bus_subscriber_drop() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx2);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_bus_clone_shares_channel() {
        let bus1 = EventBus::new();
        let _rx = bus1.subscribe();

        let bus2 = bus1.clone();
        assert_eq!(bus1.subscriber_count(), 1);
        assert_eq!(bus2.subscriber_count(), 1);

        let count = bus2.dispatch(
            DEFAULT_INTEGRATION_ID,
            Uuid::new_v4(),
            EventType::ShoppingListDeleted,
            list_data(EventOperation::Delete),
            "",
        );
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_event_bus_lagged_subscriber() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for _ in 0..5 {
            bus.dispatch(
                DEFAULT_INTEGRATION_ID,
                Uuid::new_v4(),
                EventType::ShoppingListUpdated,
                list_data(EventOperation::Update),
                "",
            );
        }

        let result = rx.recv().await;
        assert!(matches!(
            result,
            Err(broadcast::error::RecvError::Lagged(_))
        ));

        // Should still be able to receive remaining events
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_event_is_for_group() {
        let group_id = Uuid::new_v4();
        let event = Event {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            integration_id: DEFAULT_INTEGRATION_ID.to_string(),
            group_id,
            event_type: EventType::ShoppingListUpdated,
            document_data: list_data(EventOperation::Delete),
            message: String::new(),
        };

        assert!(event.is_for_group(group_id));
        assert!(!event.is_for_group(Uuid::new_v4()));
    }

    #[test]
    fn test_event_serialization() {
        let list_id = Uuid::new_v4();
        let event = Event {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            integration_id: DEFAULT_INTEGRATION_ID.to_string(),
            group_id: Uuid::new_v4(),
            event_type: EventType::ShoppingListUpdated,
            document_data: EventDocumentData::ShoppingList {
                operation: EventOperation::Delete,
                shopping_list_id: list_id,
                shopping_list_item_ids: vec![],
            },
            message: String::new(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"shopping_list_updated\""));
        assert!(json.contains("\"document_type\":\"shopping_list\""));
        assert!(json.contains("\"operation\":\"delete\""));

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.document_data, event.document_data);
        assert_eq!(parsed.document_data.operation(), EventOperation::Delete);
    }

    #[test]
    fn test_event_type_as_str_matches_serde() {
        for event_type in [
            EventType::ShoppingListCreated,
            EventType::ShoppingListUpdated,
            EventType::ShoppingListDeleted,
        ] {
            let json = serde_json::to_string(&event_type).unwrap();
            assert_eq!(json, format!("\"{}\"", event_type.as_str()));
        }
    }

    #[test]
    fn test_event_bus_default() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
    }
}
