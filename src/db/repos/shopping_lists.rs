use async_trait::async_trait;
use uuid::Uuid;

use super::{PageResult, PaginationQuery, QueryField};
use crate::{
    db::error::DbResult,
    models::{CreateShoppingList, ShoppingList},
};

/// Columns of the `shopping_lists` table usable in filters and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoppingListField {
    Name,
    CreatedAt,
    UpdatedAt,
}

impl QueryField for ShoppingListField {
    fn column(&self) -> &'static str {
        match self {
            ShoppingListField::Name => "name",
            ShoppingListField::CreatedAt => "created_at",
            ShoppingListField::UpdatedAt => "updated_at",
        }
    }
}

#[async_trait]
pub trait ShoppingListRepo: Send + Sync {
    /// Create a new shopping list within a group.
    async fn create(&self, group_id: Uuid, input: CreateShoppingList) -> DbResult<ShoppingList>;

    /// Get a shopping list by its ID.
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<ShoppingList>>;

    /// List the shopping lists of one group.
    async fn page_by_group(
        &self,
        group_id: Uuid,
        query: PaginationQuery<ShoppingListField>,
    ) -> DbResult<PageResult<ShoppingList>>;

    /// Bump `updated_at` on the given lists. Returns the number of lists updated.
    async fn touch(&self, ids: &[Uuid]) -> DbResult<u64>;
}
