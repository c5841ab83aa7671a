use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors surfaced by the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when the pool could not reach the server at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
                | DatabaseError::Sqlx(sqlx::Error::PoolClosed)
                | DatabaseError::Sqlx(sqlx::Error::Io(_))
                | DatabaseError::Sqlx(sqlx::Error::Tls(_))
        )
    }

    /// Map a unique-constraint violation onto `Conflict`, pass everything else through.
    pub fn unique_violation(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::Conflict(message.to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Process-wide owner of the Postgres connection pool
pub struct DatabaseManager;

static POOL: OnceLock<PgPool> = OnceLock::new();

impl DatabaseManager {
    /// Build the shared pool without touching the network.
    ///
    /// Connections are opened on first use so the server can come up (and
    /// report a degraded `/health`) while the database is still unreachable.
    pub fn init(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if let Some(pool) = POOL.get() {
            return Ok(pool.clone());
        }

        let pool = Self::connect_lazy(config)?;
        let pool = POOL.get_or_init(|| pool).clone();
        info!(
            "Database pool configured (max_connections={}, acquire_timeout={}s)",
            config.max_connections, config.connect_timeout_secs
        );
        Ok(pool)
    }

    /// Build a standalone pool (CLI commands, tests) from configuration.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = PgConnectOptions::from_str(&config.connection_url())
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        Ok(PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_lazy_with(options))
    }

    /// Pings the database to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Apply embedded migrations from `migrations/`.
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the shared pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = POOL.get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
