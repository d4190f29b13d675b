//! Configuration loader for the `vrisa-aqi` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Number of staged AQI readings written per batch during backfill.
    pub backfill_batch_size: usize,

    /// WAQI city feed URL (including its token); ingestion is disabled when unset.
    pub waqi_feed_url: Option<String>,

    /// Sensor that readings pulled from the WAQI feed are attributed to.
    pub waqi_sensor_id: Option<i32>,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BACKFILL_BATCH_SIZE` – AQI rows per backfill write (default: 500)
/// - `WAQI_FEED_URL` – WAQI feed to ingest from (default: unset)
/// - `WAQI_SENSOR_ID` – sensor for WAQI readings (default: unset)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let backfill_batch_size = parse_env_u32!("BACKFILL_BATCH_SIZE", 500);
    let waqi_feed_url = env::var("WAQI_FEED_URL").ok().filter(|v| !v.is_empty());
    let waqi_sensor_id = env::var("WAQI_SENSOR_ID")
        .ok()
        .map(|v| v.parse::<i32>())
        .transpose()
        .map_err(|e| anyhow!("Invalid WAQI_SENSOR_ID: {}", e))?;

    if backfill_batch_size == 0 {
        return Err(anyhow!("BACKFILL_BATCH_SIZE must be at least 1"));
    }

    Ok(Config {
        db_url,
        db_pool_max,
        backfill_batch_size: backfill_batch_size as usize,
        waqi_feed_url,
        waqi_sensor_id,
    })
}

/// Replace the password in a connection string with `****`.
fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
        }
    }
    db_url.to_string()
}

/// Replace the value of a `token=` query parameter with `****`.
fn mask_token(url: &str) -> String {
    // ---
    match url.find("token=") {
        Some(pos) => {
            let start = pos + "token=".len();
            let end = url[start..].find('&').map_or(url.len(), |i| start + i);
            format!("{}****{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords and API tokens
    /// while showing all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        let waqi_feed = self
            .waqi_feed_url
            .as_deref()
            .map_or_else(|| "(disabled)".to_string(), mask_token);
        let waqi_sensor = self
            .waqi_sensor_id
            .map_or_else(|| "(unset)".to_string(), |id| id.to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL        : {}", mask_db_url(&self.db_url));
        tracing::info!("  DB_POOL_MAX         : {}", self.db_pool_max);
        tracing::info!("  BACKFILL_BATCH_SIZE : {}", self.backfill_batch_size);
        tracing::info!("  WAQI_FEED_URL       : {}", waqi_feed);
        tracing::info!("  WAQI_SENSOR_ID      : {}", waqi_sensor);
    }
}
