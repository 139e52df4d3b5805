use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::store::config::{DEFAULT_QUERY_PATH, DEFAULT_TIMEOUT_SECS};
use crate::store::{InsertStrategy, StoreConfig, DEFAULT_CONTAINER};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Clone)]
pub struct Config {
    pub griddb_url: String,
    pub griddb_username: String,
    pub griddb_password: String,
    pub container: String,
    pub insert_strategy: InsertStrategy,
    pub query_path: String,
    pub probe_container: bool,
    pub store_timeout_secs: u64,
    pub store_debug: bool,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            griddb_url: require_env("GRIDDB_WEBAPI_URL")?,
            griddb_username: require_env("GRIDDB_USERNAME")?,
            griddb_password: require_secret("GRIDDB_PASSWORD")?,
            container: optional_env("GRIDDB_CONTAINER", DEFAULT_CONTAINER.to_string())?,
            insert_strategy: optional_env("GRIDDB_INSERT_STRATEGY", InsertStrategy::Sql)?,
            query_path: optional_env("GRIDDB_QUERY_PATH", DEFAULT_QUERY_PATH.to_string())?,
            probe_container: optional_env("GRIDDB_PROBE_CONTAINER", true)?,
            store_timeout_secs: optional_env("GRIDDB_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            store_debug: optional_env("GRIDDB_DEBUG", false)?,
            anthropic_api_key: require_secret("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.griddb_url, &self.griddb_username, &self.griddb_password)
            .with_insert_strategy(self.insert_strategy)
            .with_query_path(&self.query_path)
            .with_probe(self.probe_container)
            .with_timeout(Duration::from_secs(self.store_timeout_secs))
            .with_debug(self.store_debug)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("griddb_url", &self.griddb_url)
            .field("griddb_username", &self.griddb_username)
            .field("griddb_password", &"***")
            .field("container", &self.container)
            .field("insert_strategy", &self.insert_strategy)
            .field("query_path", &self.query_path)
            .field("probe_container", &self.probe_container)
            .field("store_timeout_secs", &self.store_timeout_secs)
            .field("store_debug", &self.store_debug)
            .field("anthropic_api_key", &"***")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

/// Like `require_env`, but the value is taken verbatim: only an empty string is missing.
fn require_secret(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        _ => Ok(default),
    }
}
