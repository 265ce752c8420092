mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;

/// Database pool.
///
/// Work is done through a [`DbSession`], which pins one pooled connection for
/// its lifetime and hands out repositories bound to that connection.
#[derive(Clone)]
pub struct DbPool {
    pool: sqlx::SqlitePool,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a database pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(std::time::Duration::from_secs(cfg.acquire_timeout_secs))
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .foreign_keys(true)
                            .journal_mode(if cfg.wal_mode {
                                sqlx::sqlite::SqliteJournalMode::Wal
                            } else {
                                sqlx::sqlite::SqliteJournalMode::Delete
                            })
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                Ok(Self { pool })
            }
        }
    }

    /// Run database migrations using sqlx's migration runner
    /// This automatically creates and manages a _sqlx_migrations table
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    /// Open a session: one connection held until the session and every
    /// repository handed out by it are dropped.
    pub async fn session(&self) -> DbResult<DbSession> {
        let conn = self.pool.acquire().await?;
        Ok(DbSession::new(Arc::new(Mutex::new(conn))))
    }
}

/// Repository trait objects bound to one session's connection.
#[derive(Clone)]
struct SessionRepos {
    groups: Arc<dyn GroupRepo>,
    shopping_lists: Arc<dyn ShoppingListRepo>,
    shopping_list_items: Arc<dyn ShoppingListItemRepo>,
}

/// A unit of work over a single pooled connection.
///
/// Cloning is cheap and shares the connection. The connection goes back to
/// the pool once the last clone (and the last repository obtained from it)
/// is dropped, whichever path the caller exits through.
#[derive(Clone)]
pub struct DbSession {
    repos: SessionRepos,
}

impl DbSession {
    fn new(conn: sqlite::SharedConnection) -> Self {
        let repos = SessionRepos {
            groups: Arc::new(sqlite::SqliteGroupRepo::new(conn.clone())),
            shopping_lists: Arc::new(sqlite::SqliteShoppingListRepo::new(conn.clone())),
            shopping_list_items: Arc::new(sqlite::SqliteShoppingListItemRepo::new(conn)),
        };
        Self { repos }
    }

    /// Get group repository
    pub fn groups(&self) -> Arc<dyn GroupRepo> {
        Arc::clone(&self.repos.groups)
    }

    /// Get shopping list repository
    pub fn shopping_lists(&self) -> Arc<dyn ShoppingListRepo> {
        Arc::clone(&self.repos.shopping_lists)
    }

    /// Get shopping list item repository
    pub fn shopping_list_items(&self) -> Arc<dyn ShoppingListItemRepo> {
        Arc::clone(&self.repos.shopping_list_items)
    }
}
