use std::collections::{BTreeSet, HashMap, HashSet};

use uuid::Uuid;

use crate::{
    db::{
        DbResult, DbSession,
        repos::{PageResult, PaginationQuery, ShoppingListItemField},
    },
    models::{BulkDeleteResult, ShoppingListItem},
};

/// Shopping list operations scoped to a single group.
///
/// Every read and write goes through the session it was built from, so a
/// caller holding one session sees its own writes.
#[derive(Clone)]
pub struct ShoppingListService {
    session: DbSession,
    group_id: Uuid,
}

impl ShoppingListService {
    pub fn new(session: DbSession, group_id: Uuid) -> Self {
        Self { session, group_id }
    }

    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    /// List items of this group's shopping lists.
    ///
    /// The group restriction is added on top of the caller's filter.
    pub async fn list_items(
        &self,
        mut query: PaginationQuery<ShoppingListItemField>,
    ) -> DbResult<PageResult<ShoppingListItem>> {
        query.filter = query
            .filter
            .eq(ShoppingListItemField::GroupId, self.group_id);
        self.session.shopping_list_items().page_all(query).await
    }

    /// Delete items by ID and bump `updated_at` on the lists they belonged to.
    ///
    /// IDs that do not exist, or that belong to another group, are reported
    /// in `not_found_ids` and left alone. Deleted items are returned in the
    /// order they were requested.
    pub async fn bulk_delete_items(&self, ids: &[Uuid]) -> DbResult<BulkDeleteResult> {
        if ids.is_empty() {
            return Ok(BulkDeleteResult::default());
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let requested: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut found: HashMap<Uuid, ShoppingListItem> = self
            .session
            .shopping_list_items()
            .get_by_ids(&requested)
            .await?
            .into_iter()
            .filter(|item| item.group_id == self.group_id)
            .map(|item| (item.id, item))
            .collect();

        let mut result = BulkDeleteResult::default();
        for id in requested {
            match found.remove(&id) {
                Some(item) => result.deleted_items.push(item),
                None => result.not_found_ids.push(id),
            }
        }

        if result.deleted_items.is_empty() {
            return Ok(result);
        }

        let delete_ids: Vec<Uuid> = result.deleted_items.iter().map(|item| item.id).collect();
        self.session
            .shopping_list_items()
            .delete_many(&delete_ids)
            .await?;

        let list_ids: Vec<Uuid> = result
            .deleted_items
            .iter()
            .map(|item| item.shopping_list_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.session.shopping_lists().touch(&list_ids).await?;

        tracing::debug!(
            group_id = %self.group_id,
            deleted = result.deleted_count(),
            not_found = result.not_found_ids.len(),
            lists_touched = list_ids.len(),
            "Bulk deleted shopping list items"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::db::{
        repos::{PerPage, QueryFilter, SortOrder},
        tests::harness::{create_test_db, seed_group, seed_items, seed_list, set_list_updated_at},
    };

    #[tokio::test]
    async fn test_list_items_is_scoped_to_group() {
        let (_pool, db) = create_test_db().await;
        let session = db.session().await.unwrap();

        let group = seed_group(&session, "home").await;
        let other = seed_group(&session, "cabin").await;
        let list = seed_list(&session, group.id, "Groceries").await;
        let other_list = seed_list(&session, other.id, "Groceries").await;
        seed_items(&session, list.id, 3, false).await;
        seed_items(&session, other_list.id, 4, false).await;

        let service = ShoppingListService::new(session, group.id);
        let page = service
            .list_items(PaginationQuery::unbounded())
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|item| item.group_id == group.id));
    }

    #[tokio::test]
    async fn test_list_items_keeps_caller_filter() {
        let (_pool, db) = create_test_db().await;
        let session = db.session().await.unwrap();

        let group = seed_group(&session, "home").await;
        let list = seed_list(&session, group.id, "Groceries").await;
        seed_items(&session, list.id, 2, true).await;
        seed_items(&session, list.id, 5, false).await;

        let service = ShoppingListService::new(session, group.id);
        let query = PaginationQuery {
            per_page: PerPage::Limit(1),
            ..PaginationQuery::default()
        }
        .with_filter(QueryFilter::new().eq(ShoppingListItemField::Checked, true))
        .order_by(ShoppingListItemField::Position, SortOrder::Asc);

        let page = service.list_items(query).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 2);
        assert!(page.items[0].checked);
    }

    #[tokio::test]
    async fn test_bulk_delete_items() {
        let (pool, db) = create_test_db().await;
        let session = db.session().await.unwrap();

        let group = seed_group(&session, "home").await;
        let list = seed_list(&session, group.id, "Groceries").await;
        let items = seed_items(&session, list.id, 4, true).await;
        drop(session);

        let stale = Utc::now() - Duration::days(7);
        set_list_updated_at(&pool, list.id, stale).await;

        let session = db.session().await.unwrap();
        let service = ShoppingListService::new(session.clone(), group.id);
        let missing = Uuid::new_v4();
        let ids = vec![items[2].id, missing, items[0].id];

        let result = service.bulk_delete_items(&ids).await.unwrap();

        assert_eq!(result.deleted_count(), 2);
        assert_eq!(result.deleted_items[0].id, items[2].id);
        assert_eq!(result.deleted_items[1].id, items[0].id);
        assert_eq!(result.not_found_ids, vec![missing]);

        let remaining = service
            .list_items(
                PaginationQuery::unbounded()
                    .order_by(ShoppingListItemField::Position, SortOrder::Asc),
            )
            .await
            .unwrap();
        let remaining_ids: Vec<Uuid> = remaining.items.iter().map(|i| i.id).collect();
        assert_eq!(remaining_ids, vec![items[1].id, items[3].id]);

        let touched = session
            .shopping_lists()
            .get_by_id(list.id)
            .await
            .unwrap()
            .unwrap();
        assert!(touched.updated_at > stale);
    }

    #[tokio::test]
    async fn test_bulk_delete_ignores_other_groups() {
        let (_pool, db) = create_test_db().await;
        let session = db.session().await.unwrap();

        let group = seed_group(&session, "home").await;
        let other = seed_group(&session, "cabin").await;
        let other_list = seed_list(&session, other.id, "Hardware").await;
        let other_items = seed_items(&session, other_list.id, 2, true).await;

        let service = ShoppingListService::new(session.clone(), group.id);
        let ids: Vec<Uuid> = other_items.iter().map(|i| i.id).collect();
        let result = service.bulk_delete_items(&ids).await.unwrap();

        assert_eq!(result.deleted_count(), 0);
        assert_eq!(result.not_found_ids, ids);

        let still_there = session
            .shopping_list_items()
            .get_by_ids(&ids)
            .await
            .unwrap();
        assert_eq!(still_there.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_delete_duplicate_and_empty_ids() {
        let (_pool, db) = create_test_db().await;
        let session = db.session().await.unwrap();

        let group = seed_group(&session, "home").await;
        let list = seed_list(&session, group.id, "Groceries").await;
        let items = seed_items(&session, list.id, 1, true).await;

        let service = ShoppingListService::new(session, group.id);

        let empty = service.bulk_delete_items(&[]).await.unwrap();
        assert_eq!(empty.deleted_count(), 0);
        assert!(empty.not_found_ids.is_empty());

        let result = service
            .bulk_delete_items(&[items[0].id, items[0].id])
            .await
            .unwrap();
        assert_eq!(result.deleted_count(), 1);
        assert!(result.not_found_ids.is_empty());
    }
}
