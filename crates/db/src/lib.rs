//! Persistence layer: connection pool, migrations, row models and one
//! repository per entity family.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod error;
pub mod lock;
pub mod models;
pub mod repositories;
pub mod store;

pub use config::PoolConfig;
pub use store::PgStore;

pub type DbPool = sqlx::PgPool;

/// Create a bounded connection pool from a database URL.
///
/// Connections are rotated after `max_lifetime`; a caller waiting for a free
/// connection gives up after `acquire_timeout`.
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded SQL migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
