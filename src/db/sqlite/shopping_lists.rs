use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{
    MAX_IDS_PER_STATEMENT, SharedConnection, parse_uuid, push_filter, push_id_list, push_page,
};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{PageResult, PaginationQuery, ShoppingListField, ShoppingListRepo},
    },
    models::{CreateShoppingList, ShoppingList},
};

pub struct SqliteShoppingListRepo {
    conn: SharedConnection,
}

impl SqliteShoppingListRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn list_from_row(row: &SqliteRow) -> DbResult<ShoppingList> {
        Ok(ShoppingList {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            group_id: parse_uuid(&row.get::<String, _>("group_id"))?,
            name: row.get("name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ShoppingListRepo for SqliteShoppingListRepo {
    async fn create(&self, group_id: Uuid, input: CreateShoppingList) -> DbResult<ShoppingList> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let mut conn = self.conn.lock().await;
        sqlx::query(
            r#"
            INSERT INTO shopping_lists (id, group_id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(group_id.to_string())
        .bind(&input.name)
        .bind(now)
        .bind(now)
        .execute(&mut **conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::Validation(format!("Group '{}' does not exist", group_id))
            }
            _ => DbError::from(e),
        })?;

        Ok(ShoppingList {
            id,
            group_id,
            name: input.name,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<ShoppingList>> {
        let mut conn = self.conn.lock().await;
        let row = sqlx::query(
            r#"
            SELECT id, group_id, name, created_at, updated_at
            FROM shopping_lists
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut **conn)
        .await?;

        row.as_ref().map(Self::list_from_row).transpose()
    }

    async fn page_by_group(
        &self,
        group_id: Uuid,
        query: PaginationQuery<ShoppingListField>,
    ) -> DbResult<PageResult<ShoppingList>> {
        let mut conn = self.conn.lock().await;

        let mut count: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM shopping_lists WHERE group_id = ");
        count.push_bind(group_id.to_string());
        push_filter(&mut count, &query.filter, true);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut **conn).await?;

        let mut select: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, group_id, name, created_at, updated_at FROM shopping_lists WHERE group_id = ",
        );
        select.push_bind(group_id.to_string());
        push_filter(&mut select, &query.filter, true);
        push_page(&mut select, &query);

        let rows = select.build().fetch_all(&mut **conn).await?;
        let items = rows
            .iter()
            .map(Self::list_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(PageResult::new(items, query.page, query.per_page, total))
    }

    async fn touch(&self, ids: &[Uuid]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now();
        let mut conn = self.conn.lock().await;
        let mut updated = 0;

        for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
            let mut builder: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new("UPDATE shopping_lists SET updated_at = ");
            builder.push_bind(now).push(" WHERE id IN ");
            push_id_list(&mut builder, chunk);

            updated += builder.build().execute(&mut **conn).await?.rows_affected();
        }

        Ok(updated)
    }
}
