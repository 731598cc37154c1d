use std::path::PathBuf;
use std::time::Duration;

use hookecho_events::delivery::DEFAULT_DELIVERY_TIMEOUT;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding callback records (default: `callbacks`).
    pub callback_dir: PathBuf,
    /// Delay before a registered callback is delivered (default: 15 s).
    pub callback_delay: Duration,
    /// Timeout of a single outbound delivery (default: 10 s).
    pub callback_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `CALLBACK_DIR`          | `callbacks`                |
    /// | `CALLBACK_DELAY_SECS`   | `15`                       |
    /// | `CALLBACK_TIMEOUT_SECS` | `10`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let callback_dir = PathBuf::from(
            std::env::var("CALLBACK_DIR").unwrap_or_else(|_| "callbacks".into()),
        );

        let callback_delay_secs: u64 = std::env::var("CALLBACK_DELAY_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("CALLBACK_DELAY_SECS must be a valid u64");

        let callback_timeout = std::env::var("CALLBACK_TIMEOUT_SECS")
            .map(|v| {
                Duration::from_secs(
                    v.parse()
                        .expect("CALLBACK_TIMEOUT_SECS must be a valid u64"),
                )
            })
            .unwrap_or(DEFAULT_DELIVERY_TIMEOUT);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            callback_dir,
            callback_delay: Duration::from_secs(callback_delay_secs),
            callback_timeout,
        }
    }
}
