use std::{str::FromStr, time::Duration};

use sqlx::{
    Error, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::info;

pub mod models;
pub mod schema;

/// Owned handle to the shared SQLite store.
///
/// Created once at startup and cloned into request state; call
/// [`DBService::close`] on shutdown so pending writes are flushed.
#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        schema::ensure_schema(&pool).await?;
        info!(database_url, max_connections, "Database ready");

        Ok(DBService { pool })
    }

    /// Private in-memory database, used by tests and the `admin` dry runs.
    ///
    /// The single connection is pinned for the lifetime of the pool since an
    /// in-memory database disappears with its last connection.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        schema::ensure_schema(&pool).await?;
        Ok(DBService { pool })
    }

    /// Shutdown hook: waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}
