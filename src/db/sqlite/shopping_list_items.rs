use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{
    MAX_IDS_PER_STATEMENT, SharedConnection, parse_uuid, push_filter, push_id_list, push_page,
};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{PageResult, PaginationQuery, ShoppingListItemField, ShoppingListItemRepo},
    },
    models::{CreateShoppingListItem, ShoppingListItem},
};

const SELECT_ITEMS: &str = r#"
    SELECT i.id, i.shopping_list_id, l.group_id, i.note, i.quantity, i.checked,
           i.position, i.created_at, i.updated_at
    FROM shopping_list_items i
    INNER JOIN shopping_lists l ON l.id = i.shopping_list_id
"#;

pub struct SqliteShoppingListItemRepo {
    conn: SharedConnection,
}

impl SqliteShoppingListItemRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn item_from_row(row: &SqliteRow) -> DbResult<ShoppingListItem> {
        Ok(ShoppingListItem {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            shopping_list_id: parse_uuid(&row.get::<String, _>("shopping_list_id"))?,
            group_id: parse_uuid(&row.get::<String, _>("group_id"))?,
            note: row.get("note"),
            quantity: row.get("quantity"),
            checked: row.get("checked"),
            position: row.get("position"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ShoppingListItemRepo for SqliteShoppingListItemRepo {
    async fn create(
        &self,
        shopping_list_id: Uuid,
        input: CreateShoppingListItem,
    ) -> DbResult<ShoppingListItem> {
        let mut conn = self.conn.lock().await;

        let group_id: Option<String> =
            sqlx::query_scalar("SELECT group_id FROM shopping_lists WHERE id = ?")
                .bind(shopping_list_id.to_string())
                .fetch_optional(&mut **conn)
                .await?;
        let group_id = match group_id {
            Some(id) => parse_uuid(&id)?,
            None => {
                return Err(DbError::Validation(format!(
                    "Shopping list '{}' does not exist",
                    shopping_list_id
                )));
            }
        };

        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO shopping_list_items
                (id, shopping_list_id, note, quantity, checked, position, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(shopping_list_id.to_string())
        .bind(&input.note)
        .bind(input.quantity)
        .bind(input.checked)
        .bind(input.position)
        .bind(now)
        .bind(now)
        .execute(&mut **conn)
        .await?;

        Ok(ShoppingListItem {
            id,
            shopping_list_id,
            group_id,
            note: input.note,
            quantity: input.quantity,
            checked: input.checked,
            position: input.position,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> DbResult<Vec<ShoppingListItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.lock().await;
        let mut items = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
            let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ITEMS);
            builder.push(" WHERE i.id IN ");
            push_id_list(&mut builder, chunk);

            let rows = builder.build().fetch_all(&mut **conn).await?;
            for row in &rows {
                items.push(Self::item_from_row(row)?);
            }
        }

        Ok(items)
    }

    async fn page_all(
        &self,
        query: PaginationQuery<ShoppingListItemField>,
    ) -> DbResult<PageResult<ShoppingListItem>> {
        let mut conn = self.conn.lock().await;

        let mut count: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM shopping_list_items i
            INNER JOIN shopping_lists l ON l.id = i.shopping_list_id
            "#,
        );
        push_filter(&mut count, &query.filter, false);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut **conn)
            .await?;

        let mut select: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ITEMS);
        push_filter(&mut select, &query.filter, false);
        push_page(&mut select, &query);

        let rows = select.build().fetch_all(&mut **conn).await?;
        let items = rows
            .iter()
            .map(Self::item_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(PageResult::new(items, query.page, query.per_page, total))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;
        let mut deleted = 0;

        for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
            let mut builder: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new("DELETE FROM shopping_list_items WHERE id IN ");
            push_id_list(&mut builder, chunk);

            deleted += builder.build().execute(&mut **conn).await?.rows_affected();
        }

        tracing::debug!(deleted, "Deleted shopping list items");
        Ok(deleted)
    }
}
