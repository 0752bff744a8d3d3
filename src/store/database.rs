//! SQLite database layer for call records
//!
//! Provides the pooled connection handle shared by the recorder and reader,
//! with automatic migration at startup and WAL mode so concurrent request
//! handlers can read while a writer commits.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Call-record database handle
///
/// Manages the SQLite connection pool. The pool sits beneath the
/// one-connection-per-operation contract: each recorder/reader call acquires
/// a connection immediately before use and returns it on every exit path.
pub struct StatsDb {
    pool: SqlitePool,
}

impl StatsDb {
    /// Connect to the store and run migrations
    ///
    /// Fails when the connection string is unusable; callers treat that as a
    /// fatal startup condition, not a runtime error.
    pub async fn new(cfg: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&cfg.url)
            .with_context(|| format!("Invalid database URL: {}", cfg.url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(cfg.acquire_timeout_seconds));

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_seconds))
            .connect_with(options)
            .await
            .context("Failed to connect to call-record database")?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .context("Failed to run call-record database migrations")?;

        tracing::info!("Call-record database migrations completed");
        Ok(())
    }

    /// Check that the store answers a trivial round-trip query
    ///
    /// Returns true only when connect + execute + fetch all succeed. Any
    /// fault at any stage yields false; this never returns an error. The
    /// connection is returned to the pool on every path.
    pub async fn check_health(&self) -> bool {
        match sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(1) => true,
            Ok(other) => {
                tracing::warn!(value = other, "Health probe returned unexpected value");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        }
    }

    /// Close the pool, releasing all connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
