//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::time::Duration;

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        Err(_) => Ok(default),
    }
}

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set")
}

/// Address the API server binds to.
pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_string())
}

/// Maximum number of pooled database connections.
pub fn db_max_connections() -> anyhow::Result<u32> {
    Ok(parsed_or("DB_MAX_CONNECTIONS", 25u32)?.max(1))
}

/// How long an idle pooled connection is kept before it is closed.
pub fn db_max_idle_time() -> anyhow::Result<Duration> {
    parsed_or("DB_MAX_IDLE_TIME_SECS", 900u64).map(Duration::from_secs)
}

/// Deployment environment reported by the healthcheck.
pub fn environment() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

/// Serve from the in-memory store instead of PostgreSQL (local runs without a database).
pub fn use_in_memory_store() -> bool {
    std::env::var("USE_IN_MEMORY_STORE")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
