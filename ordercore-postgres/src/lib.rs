//! `PostgreSQL` adapter for the `OrderCore` shop store.
//!
//! Stores each collection as JSONB documents alongside the columns the
//! store queries or constrains, with a `revision` counter per row. Commits
//! run in one SQL transaction where every guarded write carries
//! `AND revision = $expected`; a missed row aborts the transaction, so the
//! batch is all-or-nothing and stale writers lose instead of overwriting.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::time::Duration;

use nutype::nutype;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use thiserror::Error;

mod shop_store;

/// Errors raised while setting a `PostgresShopStore` up.
#[derive(Debug, Error)]
pub enum PostgresStoreError {
    /// The connection pool could not be created.
    #[error("failed to create postgres connection pool")]
    ConnectionFailed(#[source] sqlx::Error),
    /// Schema migration failed.
    #[error("failed to run postgres migrations")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),
}

/// Maximum number of database connections in the pool.
///
/// Must be at least 1, enforced by using `NonZeroU32` as the underlying
/// type.
#[nutype(derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRef, Into))]
pub struct MaxConnections(std::num::NonZeroU32);

/// Configuration for the `PostgresShopStore` connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Maximum number of connections in the pool (default: 10).
    pub max_connections: MaxConnections,
    /// Timeout for acquiring a connection from the pool (default: 30 seconds).
    pub acquire_timeout: Duration,
    /// Idle timeout for connections in the pool (default: 10 minutes).
    pub idle_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        const DEFAULT_MAX_CONNECTIONS: std::num::NonZeroU32 = match std::num::NonZeroU32::new(10) {
            Some(v) => v,
            None => unreachable!(),
        };

        Self {
            max_connections: MaxConnections::new(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600), // 10 minutes
        }
    }
}

/// `PostgreSQL`-backed shop store.
#[derive(Debug, Clone)]
pub struct PostgresShopStore {
    pool: Pool<Postgres>,
}

impl PostgresShopStore {
    /// Create a new store with default pool configuration.
    pub async fn new<S: Into<String>>(connection_string: S) -> Result<Self, PostgresStoreError> {
        Self::with_config(connection_string, PostgresConfig::default()).await
    }

    /// Create a new store with custom pool configuration.
    pub async fn with_config<S: Into<String>>(
        connection_string: S,
        config: PostgresConfig,
    ) -> Result<Self, PostgresStoreError> {
        let connection_string = connection_string.into();
        let max_connections: std::num::NonZeroU32 = config.max_connections.into();
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.get())
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect(&connection_string)
            .await
            .map_err(PostgresStoreError::ConnectionFailed)?;
        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool.
    ///
    /// Use this when you need full control over pool configuration or want
    /// to share a pool across multiple components.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Run the schema migrations bundled with this crate.
    pub async fn migrate(&self) -> Result<(), PostgresStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(PostgresStoreError::MigrationFailed)
    }

    pub(crate) const fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}
