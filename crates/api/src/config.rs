/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `9200`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Number of prober workers sharing the enabled health checks (default: `1`).
    pub probers: u32,
    /// Period of the push-gateway eviction sweep in seconds (default: `60`).
    pub pushgateway_cleanup_interval_secs: u64,
    /// Emit JSON log lines instead of human-readable ones (`LOG_FORMAT=json`).
    pub json_logs: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default   |
    /// |-------------------------------------|-----------|
    /// | `HOST`                              | `0.0.0.0` |
    /// | `PORT`                              | `9200`    |
    /// | `REQUEST_TIMEOUT_SECS`              | `30`      |
    /// | `PROBERS`                           | `1`       |
    /// | `PUSHGATEWAY_CLEANUP_INTERVAL_SECS` | `60`      |
    /// | `LOG_FORMAT`                        | `text`    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "9200".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let probers: u32 = std::env::var("PROBERS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("PROBERS must be a valid u32");
        assert!(probers > 0, "PROBERS must be at least 1");

        let pushgateway_cleanup_interval_secs: u64 =
            std::env::var("PUSHGATEWAY_CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .expect("PUSHGATEWAY_CLEANUP_INTERVAL_SECS must be a valid u64");
        assert!(
            pushgateway_cleanup_interval_secs > 0,
            "PUSHGATEWAY_CLEANUP_INTERVAL_SECS must be at least 1"
        );

        let json_logs = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self {
            host,
            port,
            request_timeout_secs,
            probers,
            pushgateway_cleanup_interval_secs,
            json_logs,
        }
    }
}
