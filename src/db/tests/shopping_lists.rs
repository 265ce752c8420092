//! Shared tests for ShoppingListRepo implementations

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{
        error::DbError,
        repos::{
            GroupRepo, PaginationQuery, PerPage, QueryFilter, ShoppingListField, ShoppingListRepo,
            SortOrder,
        },
    },
    models::{CreateGroup, CreateShoppingList},
};

fn create_list_input(name: &str) -> CreateShoppingList {
    CreateShoppingList {
        name: name.to_string(),
    }
}

/// Test context containing repos needed for shopping list tests
pub struct ShoppingListTestContext<'a> {
    pub list_repo: &'a dyn ShoppingListRepo,
    pub group_repo: &'a dyn GroupRepo,
}

impl ShoppingListTestContext<'_> {
    /// Create a test group and return its ID
    pub async fn create_test_group(&self, slug: &str) -> Uuid {
        self.group_repo
            .create(CreateGroup {
                slug: slug.to_string(),
                name: format!("Group {}", slug),
            })
            .await
            .expect("Failed to create test group")
            .id
    }
}

pub async fn test_create_list(ctx: &ShoppingListTestContext<'_>) {
    let group_id = ctx.create_test_group("home").await;

    let list = ctx
        .list_repo
        .create(group_id, create_list_input("Groceries"))
        .await
        .expect("Failed to create list");

    assert_eq!(list.name, "Groceries");
    assert_eq!(list.group_id, group_id);

    let fetched = ctx
        .list_repo
        .get_by_id(list.id)
        .await
        .expect("Query failed")
        .expect("List not found");
    assert_eq!(fetched.group_id, group_id);
}

pub async fn test_create_list_unknown_group_fails(ctx: &ShoppingListTestContext<'_>) {
    let result = ctx
        .list_repo
        .create(Uuid::new_v4(), create_list_input("Orphan"))
        .await;

    assert!(matches!(result, Err(DbError::Validation(_))));
}

pub async fn test_get_by_id_not_found(ctx: &ShoppingListTestContext<'_>) {
    let result = ctx
        .list_repo
        .get_by_id(Uuid::new_v4())
        .await
        .expect("Query failed");
    assert!(result.is_none());
}

pub async fn test_page_by_group_filters_by_group(ctx: &ShoppingListTestContext<'_>) {
    let home = ctx.create_test_group("home").await;
    let cabin = ctx.create_test_group("cabin").await;

    for name in ["Groceries", "Pharmacy", "Hardware"] {
        ctx.list_repo
            .create(home, create_list_input(name))
            .await
            .expect("Failed to create list");
    }
    ctx.list_repo
        .create(cabin, create_list_input("Firewood"))
        .await
        .expect("Failed to create list");

    let page = ctx
        .list_repo
        .page_by_group(home, PaginationQuery::unbounded())
        .await
        .expect("Query failed");

    assert_eq!(page.total, 3);
    assert!(page.items.iter().all(|l| l.group_id == home));
    let names: Vec<&str> = page.items.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Groceries", "Pharmacy", "Hardware"]);
}

pub async fn test_page_by_group_with_filter_and_limit(ctx: &ShoppingListTestContext<'_>) {
    let home = ctx.create_test_group("home").await;

    for name in ["b", "a", "c", "a"] {
        ctx.list_repo
            .create(home, create_list_input(name))
            .await
            .expect("Failed to create list");
    }

    let query = PaginationQuery {
        per_page: PerPage::Limit(1),
        ..Default::default()
    }
    .with_filter(QueryFilter::new().ne(ShoppingListField::Name, "a"))
    .order_by(ShoppingListField::Name, SortOrder::Desc);

    let page = ctx
        .list_repo
        .page_by_group(home, query)
        .await
        .expect("Query failed");

    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "c");
}

pub async fn test_touch_updates_timestamp(ctx: &ShoppingListTestContext<'_>) {
    let home = ctx.create_test_group("home").await;
    let list = ctx
        .list_repo
        .create(home, create_list_input("Groceries"))
        .await
        .expect("Failed to create list");
    let before = Utc::now() - Duration::milliseconds(1);

    let updated = ctx
        .list_repo
        .touch(&[list.id, Uuid::new_v4()])
        .await
        .expect("Touch failed");
    assert_eq!(updated, 1);

    let fetched = ctx
        .list_repo
        .get_by_id(list.id)
        .await
        .expect("Query failed")
        .expect("List not found");
    assert!(fetched.updated_at >= list.updated_at);
    assert!(fetched.updated_at > before);
    assert_eq!(fetched.created_at, list.created_at);
}

pub async fn test_touch_empty(ctx: &ShoppingListTestContext<'_>) {
    let updated = ctx.list_repo.touch(&[]).await.expect("Touch failed");
    assert_eq!(updated, 0);
}

mod sqlite_tests {
    use super::*;
    use crate::db::tests::harness::create_test_db;

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let (_pool, db) = create_test_db().await;
                let session = db.session().await.expect("Failed to open session");
                let list_repo = session.shopping_lists();
                let group_repo = session.groups();
                let ctx = ShoppingListTestContext {
                    list_repo: &*list_repo,
                    group_repo: &*group_repo,
                };
                super::$name(&ctx).await;
            }
        };
    }

    sqlite_test!(test_create_list);
    sqlite_test!(test_create_list_unknown_group_fails);
    sqlite_test!(test_get_by_id_not_found);
    sqlite_test!(test_page_by_group_filters_by_group);
    sqlite_test!(test_page_by_group_with_filter_and_limit);
    sqlite_test!(test_touch_updates_timestamp);
    sqlite_test!(test_touch_empty);
}
