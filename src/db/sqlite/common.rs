use std::sync::Arc;

use sqlx::{QueryBuilder, Sqlite, pool::PoolConnection};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{
    error::{DbError, DbResult},
    repos::{FilterValue, PaginationQuery, QueryField, QueryFilter},
};

/// Maximum number of ids bound into a single `IN (...)` list.
pub const MAX_IDS_PER_STATEMENT: usize = 500;

/// The pooled connection owned by a [`crate::db::DbSession`], shared by every
/// repository created from that session.
pub type SharedConnection = Arc<Mutex<PoolConnection<Sqlite>>>;

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Append the filter's clauses as `WHERE ... AND ...`.
///
/// `has_where` must be true when the builder already contains a `WHERE`.
pub fn push_filter<F: QueryField>(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filter: &QueryFilter<F>,
    mut has_where: bool,
) {
    for clause in filter.clauses() {
        builder.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;

        builder
            .push(clause.field.column())
            .push(" ")
            .push(clause.op.as_sql())
            .push(" ");

        match &clause.value {
            FilterValue::Uuid(id) => builder.push_bind(id.to_string()),
            FilterValue::Bool(b) => builder.push_bind(*b),
            FilterValue::Int(n) => builder.push_bind(*n),
            FilterValue::Text(s) => builder.push_bind(s.clone()),
        };
    }
}

/// Append `ORDER BY`, `LIMIT` and `OFFSET` for a page query.
///
/// Without an explicit `order_by` rows come back in insertion order.
pub fn push_page<F: QueryField>(builder: &mut QueryBuilder<'_, Sqlite>, query: &PaginationQuery<F>) {
    if let Some(field) = query.order_by {
        builder
            .push(" ORDER BY ")
            .push(field.column())
            .push(" ")
            .push(query.order_direction.as_sql());
    }

    builder
        .push(" LIMIT ")
        .push_bind(query.per_page.as_sql_limit())
        .push(" OFFSET ")
        .push_bind(query.offset());
}

/// Append `(?, ?, ...)` with one bound parameter per id.
pub fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");
}
