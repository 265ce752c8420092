//! Pruning of old checked shopping-list items.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        DbError, DbPool, DbResult,
        repos::{PaginationQuery, QueryFilter, ShoppingListItemField, SortOrder},
    },
    events::{EventBus, GroupEventPublisher, publish_list_item_events},
    observability::metrics,
    services::ShoppingListService,
};

/// Number of most recently updated checked items kept on each list.
pub const MAX_CHECKED_ITEMS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error("Group not found: \"{0}\"")]
    GroupNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Summary of one pruning run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckedItemsRunResult {
    pub groups_scanned: usize,
    pub lists_scanned: usize,
    /// Lists that had at least one item removed.
    pub lists_trimmed: usize,
    pub items_deleted: u64,
}

impl CheckedItemsRunResult {
    pub fn has_deletions(&self) -> bool {
        self.items_deleted > 0
    }
}

/// Delete checked items beyond the newest `max_checked_items` on every
/// shopping list of one group, or of every group when `group_id` is `None`.
///
/// The whole run shares one database session. Each deleted item is announced
/// with a `ShoppingListUpdated` event on the owning group.
pub async fn delete_old_checked_list_items(
    db: &DbPool,
    event_bus: Arc<EventBus>,
    group_id: Option<Uuid>,
    max_checked_items: usize,
) -> Result<CheckedItemsRunResult, RetentionError> {
    let session = db.session().await?;

    let groups = match group_id {
        None => {
            session
                .groups()
                .page_all(PaginationQuery::unbounded())
                .await?
                .items
        }
        Some(id) => {
            let group = session
                .groups()
                .get_by_id(id)
                .await?
                .ok_or(RetentionError::GroupNotFound(id))?;
            vec![group]
        }
    };

    let mut result = CheckedItemsRunResult::default();

    for group in groups {
        let publisher = GroupEventPublisher::new(Arc::clone(&event_bus), group.id);
        let service = ShoppingListService::new(session.clone(), group.id);
        let lists = session
            .shopping_lists()
            .page_by_group(group.id, PaginationQuery::unbounded())
            .await?
            .items;

        result.groups_scanned += 1;

        for list in lists {
            result.lists_scanned += 1;

            let deleted = trim_list_items(&service, list.id, &publisher, max_checked_items).await?;
            if deleted > 0 {
                result.lists_trimmed += 1;
                result.items_deleted += deleted as u64;
            }
        }
    }

    if result.has_deletions() {
        metrics::record_retention_deletion(result.items_deleted);
    }

    tracing::debug!(
        groups = result.groups_scanned,
        lists = result.lists_scanned,
        lists_trimmed = result.lists_trimmed,
        items_deleted = result.items_deleted,
        "Checked item pruning finished"
    );

    Ok(result)
}

/// Keep the newest `max_checked_items` checked items on one list and delete
/// the rest. Unchecked items are never considered.
///
/// Returns the number of items deleted.
pub async fn trim_list_items(
    service: &ShoppingListService,
    shopping_list_id: Uuid,
    publisher: &GroupEventPublisher,
    max_checked_items: usize,
) -> DbResult<usize> {
    let query = PaginationQuery::unbounded()
        .with_filter(
            QueryFilter::new()
                .eq(ShoppingListItemField::ShoppingListId, shopping_list_id)
                .eq(ShoppingListItemField::Checked, true),
        )
        .order_by(ShoppingListItemField::UpdatedAt, SortOrder::Desc);

    let page = service.list_items(query).await?;
    if page.items.len() <= max_checked_items {
        return Ok(0);
    }

    let stale: Vec<Uuid> = page.items[max_checked_items..]
        .iter()
        .map(|item| item.id)
        .collect();

    let response = service.bulk_delete_items(&stale).await?;
    publish_list_item_events(publisher, &response);

    tracing::debug!(
        shopping_list_id = %shopping_list_id,
        checked = page.items.len(),
        deleted = response.deleted_count(),
        "Trimmed checked items"
    );

    Ok(response.deleted_count())
}
