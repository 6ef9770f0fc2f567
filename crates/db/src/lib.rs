//! Postgres persistence for the fleet back office: schema migrations, row
//! models, repositories and the lifecycle store binding.

pub mod config;
pub mod lifecycle_store;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub use config::{ConfigError, DbConfig};
pub use lifecycle_store::PgLifecycleStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.database_url)
        .await
}

/// Round-trip a trivial query to verify the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
