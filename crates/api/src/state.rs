use std::sync::Arc;

use vigil_db::PgStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and the config sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vigil_db::DbPool,
    /// Store implementing the entity contracts over `pool`.
    pub store: PgStore,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: vigil_db::DbPool, config: ServerConfig) -> Self {
        Self {
            store: PgStore::new(pool.clone()),
            pool,
            config: Arc::new(config),
        }
    }
}
