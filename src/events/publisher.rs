use std::sync::Arc;

use uuid::Uuid;

use super::{DEFAULT_INTEGRATION_ID, EventBus, EventDocumentData, EventOperation, EventType};
use crate::models::BulkDeleteResult;

/// Publishes events on behalf of one group as the system integration.
///
/// Holds no state beyond the bus handle and the group id.
#[derive(Debug, Clone)]
pub struct GroupEventPublisher {
    bus: Arc<EventBus>,
    group_id: Uuid,
}

impl GroupEventPublisher {
    pub fn new(bus: Arc<EventBus>, group_id: Uuid) -> Self {
        Self { bus, group_id }
    }

    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    pub fn publish(
        &self,
        event_type: EventType,
        document_data: EventDocumentData,
        message: impl Into<String>,
    ) {
        self.bus.dispatch(
            DEFAULT_INTEGRATION_ID,
            self.group_id,
            event_type,
            document_data,
            message,
        );
    }

    /// Publish with an empty message.
    pub fn publish_event(&self, event_type: EventType, document_data: EventDocumentData) {
        self.publish(event_type, document_data, "");
    }
}

/// Announce every item removed by a bulk delete, one event per item.
///
/// Returns the number of events published.
pub fn publish_list_item_events(
    publisher: &GroupEventPublisher,
    result: &BulkDeleteResult,
) -> usize {
    for item in &result.deleted_items {
        publisher.publish_event(
            EventType::ShoppingListUpdated,
            EventDocumentData::ShoppingList {
                operation: EventOperation::Delete,
                shopping_list_id: item.shopping_list_id,
                shopping_list_item_ids: vec![item.id],
            },
        );
    }
    result.deleted_items.len()
}
