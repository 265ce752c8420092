use async_trait::async_trait;
use uuid::Uuid;

use super::{PageResult, PaginationQuery, QueryField};
use crate::{
    db::error::DbResult,
    models::{CreateGroup, Group},
};

/// Columns of the `groups` table usable in filters and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Slug,
    Name,
    CreatedAt,
    UpdatedAt,
}

impl QueryField for GroupField {
    fn column(&self) -> &'static str {
        match self {
            GroupField::Slug => "slug",
            GroupField::Name => "name",
            GroupField::CreatedAt => "created_at",
            GroupField::UpdatedAt => "updated_at",
        }
    }
}

#[async_trait]
pub trait GroupRepo: Send + Sync {
    /// Create a new group.
    async fn create(&self, input: CreateGroup) -> DbResult<Group>;

    /// Get a group by its ID.
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Group>>;

    /// List groups matching the query.
    async fn page_all(&self, query: PaginationQuery<GroupField>) -> DbResult<PageResult<Group>>;
}
