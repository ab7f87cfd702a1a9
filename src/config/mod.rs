//! Configuration module for the corrida backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Lower bound of the jittered delay between notification passes
    pub push_min_interval: Duration,
    /// Upper bound of the jittered delay between notification passes
    pub push_max_interval: Duration,
    /// Timeout for a single push delivery attempt
    pub push_timeout: Duration,
    /// Staleness window for the "driver is reporting" liveness check
    pub recent_window: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("CORRIDA_DB_PATH")
            .unwrap_or_else(|_| "./data/corridas.sqlite".to_string())
            .into();

        let bind_addr = env::var("CORRIDA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .expect("Invalid CORRIDA_BIND_ADDR format");

        let log_level = env::var("CORRIDA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let push_min_interval = duration_from_env("CORRIDA_PUSH_MIN_SECS", 300);
        let push_max_interval = duration_from_env("CORRIDA_PUSH_MAX_SECS", 600);
        let push_timeout = duration_from_env("CORRIDA_PUSH_TIMEOUT_SECS", 10);
        let recent_window = duration_from_env("CORRIDA_RECENT_WINDOW_SECS", 600);

        Self {
            db_path,
            bind_addr,
            log_level,
            push_min_interval,
            push_max_interval,
            push_timeout,
            recent_window,
        }
    }
}

fn duration_from_env(key: &str, default_secs: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
