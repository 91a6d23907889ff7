use std::str::FromStr;

/// Connection pool settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum open connections (default: `10`).
    pub max_connections: u32,
    /// Idle connections kept open (default: `0`).
    pub min_connections: u32,
    /// Connection lifetime before rotation, in seconds (default: `60`).
    pub max_lifetime_secs: u64,
    /// How long a caller waits for a free connection, in seconds (default: `5`).
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            max_lifetime_secs: 60,
            acquire_timeout_secs: 5,
        }
    }
}

impl PoolConfig {
    /// Load pool settings from the environment, falling back to defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `DB_MAX_CONNECTIONS`      | `10`    |
    /// | `DB_MIN_CONNECTIONS`      | `0`     |
    /// | `DB_MAX_LIFETIME_SECS`    | `60`    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`     |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs),
        }
    }
}

/// Read and parse `key`, panicking on an unparsable value so that
/// misconfiguration fails at startup.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}
