use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{SharedConnection, parse_uuid, push_filter, push_page};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{GroupField, GroupRepo, PageResult, PaginationQuery},
    },
    models::{CreateGroup, Group},
};

pub struct SqliteGroupRepo {
    conn: SharedConnection,
}

impl SqliteGroupRepo {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn group_from_row(row: &SqliteRow) -> DbResult<Group> {
        Ok(Group {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            slug: row.get("slug"),
            name: row.get("name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl GroupRepo for SqliteGroupRepo {
    async fn create(&self, input: CreateGroup) -> DbResult<Group> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let mut conn = self.conn.lock().await;
        sqlx::query(
            r#"
            INSERT INTO groups (id, slug, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.slug)
        .bind(&input.name)
        .bind(now)
        .bind(now)
        .execute(&mut **conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Group with slug '{}' already exists", input.slug))
            }
            _ => DbError::from(e),
        })?;

        Ok(Group {
            id,
            slug: input.slug,
            name: input.name,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Group>> {
        let mut conn = self.conn.lock().await;
        let row = sqlx::query(
            r#"
            SELECT id, slug, name, created_at, updated_at
            FROM groups
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut **conn)
        .await?;

        row.as_ref().map(Self::group_from_row).transpose()
    }

    async fn page_all(&self, query: PaginationQuery<GroupField>) -> DbResult<PageResult<Group>> {
        let mut conn = self.conn.lock().await;

        let mut count: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM groups");
        push_filter(&mut count, &query.filter, false);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut **conn).await?;

        let mut select: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, slug, name, created_at, updated_at FROM groups");
        push_filter(&mut select, &query.filter, false);
        push_page(&mut select, &query);

        let rows = select.build().fetch_all(&mut **conn).await?;
        let items = rows
            .iter()
            .map(Self::group_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(PageResult::new(items, query.page, query.per_page, total))
    }
}
