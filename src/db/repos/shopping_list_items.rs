use async_trait::async_trait;
use uuid::Uuid;

use super::{PageResult, PaginationQuery, QueryField};
use crate::{
    db::error::DbResult,
    models::{CreateShoppingListItem, ShoppingListItem},
};

/// Filterable columns for shopping list items.
///
/// `GroupId` comes from the joined parent list, so item queries can be scoped
/// to a household without a separate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoppingListItemField {
    ShoppingListId,
    GroupId,
    Checked,
    Position,
    CreatedAt,
    UpdatedAt,
}

impl QueryField for ShoppingListItemField {
    fn column(&self) -> &'static str {
        match self {
            ShoppingListItemField::ShoppingListId => "i.shopping_list_id",
            ShoppingListItemField::GroupId => "l.group_id",
            ShoppingListItemField::Checked => "i.checked",
            ShoppingListItemField::Position => "i.position",
            ShoppingListItemField::CreatedAt => "i.created_at",
            ShoppingListItemField::UpdatedAt => "i.updated_at",
        }
    }
}

#[async_trait]
pub trait ShoppingListItemRepo: Send + Sync {
    /// Add an item to a shopping list.
    async fn create(
        &self,
        shopping_list_id: Uuid,
        input: CreateShoppingListItem,
    ) -> DbResult<ShoppingListItem>;

    /// Get multiple items by their IDs in a single query.
    /// Returns items in no particular order. Missing IDs are silently ignored.
    async fn get_by_ids(&self, ids: &[Uuid]) -> DbResult<Vec<ShoppingListItem>>;

    /// List items matching the query.
    async fn page_all(
        &self,
        query: PaginationQuery<ShoppingListItemField>,
    ) -> DbResult<PageResult<ShoppingListItem>>;

    /// Hard-delete items by ID. Returns the number of rows removed.
    async fn delete_many(&self, ids: &[Uuid]) -> DbResult<u64>;
}
