//! Database connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

// Lookups are single-row point queries; a couple of connections is plenty.
const MAX_CONNECTIONS: u32 = 2;

/// Connection pool over a Calibre `metadata.db`.
///
/// Calibre owns the database; connections made through [`Database::connect`]
/// never write to it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: u32, read_only: bool) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Per-connection PRAGMAs must be applied on every connection the
            // pool opens, not only the first.
            .after_connect(move |conn, _meta| Box::pin(async move {
                Self::apply_pragmas(conn, read_only).await
            }))
            .max_connections(max)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(Self { pool })
    }

    /// Connect read-only to the database file at `path`.
    ///
    /// The file must already exist.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).read_only(true).create_if_missing(false);
        Self::new(options, MAX_CONNECTIONS, true).await
    }

    /// Connect to a writable in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Not `#[cfg(test)]`, so that other crates can seed their own test libraries.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Each in-memory connection is its own database, so keep exactly one.
        Self::new(options, 1, false).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // Calibre may be writing while we read.
            .busy_timeout(Duration::from_millis(1500))
    }

    async fn apply_pragmas(conn: &mut SqliteConnection, read_only: bool) -> sqlx::Result<()> {
        if read_only {
            sqlx::query("PRAGMA query_only = ON;").execute(conn).await?;
        }
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
