//! Connection settings and per-deployment wire choices.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::ColumnSchema;

pub const DEFAULT_QUERY_PATH: &str = "/sql/dml/query";
pub const DEFAULT_UPDATE_PATH: &str = "/sql/update";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How rows are written.
///
/// `Sql` sends an `INSERT` statement to the update endpoint with text values
/// quote-escaped. `DirectRow` PUTs a positional JSON row to the container's
/// rows endpoint with no SQL involved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertStrategy {
    #[default]
    Sql,
    DirectRow,
}

impl FromStr for InsertStrategy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(InsertStrategy::Sql),
            "direct_row" | "direct-row" | "row" => Ok(InsertStrategy::DirectRow),
            other => Err(StoreError::Configuration(format!(
                "unknown insert strategy '{other}' (expected 'sql' or 'direct_row')"
            ))),
        }
    }
}

/// Store client configuration. Immutable once handed to `StoreClient::new`.
#[derive(Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Layout used by `ensure_container` and `insert_record`.
    pub schema: ColumnSchema,
    pub insert_strategy: InsertStrategy,
    /// SQL-execution endpoint. Deployments differ (`/sql` vs `/sql/dml/query`).
    pub query_path: String,
    pub update_path: String,
    /// Probe `GET /containers/{name}/info` before creating.
    pub probe_before_create: bool,
    pub timeout: Duration,
    /// Emit request diagnostics at debug level. Credentials are never logged.
    pub debug: bool,
}

impl StoreConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            schema: ColumnSchema::resumes(),
            insert_strategy: InsertStrategy::default(),
            query_path: DEFAULT_QUERY_PATH.to_string(),
            update_path: DEFAULT_UPDATE_PATH.to_string(),
            probe_before_create: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
        }
    }

    pub fn with_schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_insert_strategy(mut self, strategy: InsertStrategy) -> Self {
        self.insert_strategy = strategy;
        self
    }

    pub fn with_query_path(mut self, path: impl Into<String>) -> Self {
        self.query_path = path.into();
        self
    }

    pub fn with_update_path(mut self, path: impl Into<String>) -> Self {
        self.update_path = path.into();
        self
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe_before_create = probe;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub(crate) fn validate(&self) -> StoreResult<()> {
        for (field, value) in [("baseUrl", &self.base_url), ("username", &self.username)] {
            if value.trim().is_empty() {
                return Err(StoreError::Configuration(format!("{field} is required")));
            }
        }
        // Passwords are opaque: whitespace is a legitimate password.
        if self.password.is_empty() {
            return Err(StoreError::Configuration("password is required".to_string()));
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            StoreError::Configuration(format!("baseUrl '{}' is not a valid URL: {e}", self.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::Configuration(format!(
                "baseUrl must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        for (field, path) in [("query path", &self.query_path), ("update path", &self.update_path)] {
            if !path.starts_with('/') {
                return Err(StoreError::Configuration(format!(
                    "{field} '{path}' must start with '/'"
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(StoreError::Configuration("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("schema", &self.schema)
            .field("insert_strategy", &self.insert_strategy)
            .field("query_path", &self.query_path)
            .field("update_path", &self.update_path)
            .field("probe_before_create", &self.probe_before_create)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Pre-computed `Authorization` value. Redacted in `Debug`.
#[derive(Clone)]
pub(crate) struct BasicAuth(String);

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self(format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))))
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BasicAuth(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(StoreConfig::new("http://store", "u", "p").validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_configuration_errors() {
        for (url, user, pass) in [("", "u", "p"), ("http://store", "", "p"), ("http://store", "u", "")] {
            let err = StoreConfig::new(url, user, pass).validate().unwrap_err();
            assert!(matches!(err, StoreError::Configuration(_)), "{url:?} {user:?} {pass:?}");
        }
    }

    #[test]
    fn test_whitespace_password_is_accepted() {
        assert!(StoreConfig::new("http://store", "u", "  ").validate().is_ok());
        assert!(StoreConfig::new("http://store", "  ", "p").validate().is_err());
    }

    #[test]
    fn test_bad_url_and_paths() {
        assert!(StoreConfig::new("not a url", "u", "p").validate().is_err());
        assert!(StoreConfig::new("ftp://store", "u", "p").validate().is_err());
        assert!(StoreConfig::new("http://store", "u", "p")
            .with_query_path("sql")
            .validate()
            .is_err());
    }

    #[test]
    fn test_basic_auth_encoding() {
        let auth = BasicAuth::new("u", "p");
        assert_eq!(auth.header_value(), "Basic dTpw");
    }

    #[test]
    fn test_debug_output_redacts_credentials() {
        let config = StoreConfig::new("http://store", "admin", "s3cret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("admin"));

        let auth = BasicAuth::new("admin", "s3cret");
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains(auth.header_value()));
    }

    #[test]
    fn test_insert_strategy_from_str() {
        assert_eq!("sql".parse::<InsertStrategy>().unwrap(), InsertStrategy::Sql);
        assert_eq!("DIRECT_ROW".parse::<InsertStrategy>().unwrap(), InsertStrategy::DirectRow);
        assert!("bulk".parse::<InsertStrategy>().is_err());
    }
}
