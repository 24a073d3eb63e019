use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use super::infrastructure::postgres::{
    PostgresAccessRepository, PostgresUsersRepository,
};
use super::ports::{AccessRepository, UsersRepository};
use crate::error::{Result, UserError};

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
    pub min_idle: u32,
}

/// Connection pool sizing and acquisition limits.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Upper bound on waiting for a pooled connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Owns the pool and hands out the repositories built on it.
#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
    users: PostgresUsersRepository,
    access: PostgresAccessRepository,
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str, settings: PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                UserError::Internal(format!("Database connection failed: {}", e))
            })?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            settings.max_connections, settings.min_connections
        );

        Ok(Self::with_settings(pool, settings))
    }

    /// Wrap an existing pool (tests, embedding callers).
    pub fn from_pool(pool: PgPool) -> Self {
        Self::with_settings(pool, PoolSettings::default())
    }

    fn with_settings(pool: PgPool, settings: PoolSettings) -> Self {
        let users = PostgresUsersRepository::new(pool.clone());
        let access = PostgresAccessRepository::new(pool.clone());

        Self {
            pool,
            settings,
            users,
            access,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.settings.max_connections,
            min_idle: self.settings.min_connections,
        }
    }

    /// Apply the embedded migrations.
    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            UserError::Internal(format!("Failed to run migrations: {}", e))
        })?;

        info!("Database schema is up to date");
        Ok(())
    }

    pub fn users(&self) -> Arc<dyn UsersRepository> {
        Arc::new(self.users.clone())
    }

    pub fn access(&self) -> Arc<dyn AccessRepository> {
        Arc::new(self.access.clone())
    }
}
