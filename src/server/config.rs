//! Deployment configuration for the `count-todos` function.
//!
//! The store URL and the service-level key are injected at the deployment
//! boundary, either through environment variables or a TOML file. They are
//! never part of client code.
//!
//! | Variable                        | Default                      |
//! |---------------------------------|------------------------------|
//! | `TASKLIST_STORE_URL`            | required                     |
//! | `TASKLIST_SERVICE_KEY`          | required                     |
//! | `TASKLIST_BIND`                 | `0.0.0.0:8000`               |
//! | `TASKLIST_FUNCTION_PATH`        | `/functions/v1/count-todos`  |
//! | `TASKLIST_REQUEST_TIMEOUT_SECS` | `10`                         |

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the store/provider base URL.
pub const ENV_STORE_URL: &str = "TASKLIST_STORE_URL";
/// Environment variable holding the service-level key.
pub const ENV_SERVICE_KEY: &str = "TASKLIST_SERVICE_KEY";
/// Environment variable holding the listen address.
pub const ENV_BIND: &str = "TASKLIST_BIND";
/// Environment variable holding the function route.
pub const ENV_FUNCTION_PATH: &str = "TASKLIST_FUNCTION_PATH";
/// Environment variable holding the outbound request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT: &str = "TASKLIST_REQUEST_TIMEOUT_SECS";

/// Route the count function is served on unless configured otherwise.
pub const DEFAULT_FUNCTION_PATH: &str = "/functions/v1/count-todos";

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_function_path() -> String {
    DEFAULT_FUNCTION_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Configuration for the aggregation service process.
///
/// # Examples
///
/// ```
/// use tasklist::server::config::ServiceConfig;
///
/// let config = ServiceConfig::from_toml_str(r#"
///     store_url = "https://db.example.co"
///     service_key = "service-role-key"
/// "#).unwrap();
/// assert_eq!(config.bind.port(), 8000);
/// assert_eq!(config.function_path, "/functions/v1/count-todos");
/// assert!(!format!("{config:?}").contains("service-role-key"));
/// ```
#[derive(Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the hosted store and authentication provider.
    pub store_url: Url,

    /// Service-level credential used for store queries and token checks.
    pub service_key: String,

    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Route the count function is served on.
    #[serde(default = "default_function_path")]
    pub function_path: String,

    /// Outbound request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("store_url", &self.store_url.as_str())
            .field("service_key", &"[REDACTED]")
            .field("bind", &self.bind)
            .field("function_path", &self.function_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a configuration with defaults for everything but the
    /// credentials.
    pub fn new(store_url: Url, service_key: impl Into<String>) -> Self {
        Self {
            store_url,
            service_key: service_key.into(),
            bind: default_bind(),
            function_path: default_function_path(),
            request_timeout_secs: default_timeout_secs(),
        }
    }

    /// Outbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load from `TASKLIST_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a required variable is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. `from_env` delegates here.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::config(format!("{key} is not set")))
        };

        let store_url = parse_value(ENV_STORE_URL, &required(ENV_STORE_URL)?)?;
        let mut config = Self::new(store_url, required(ENV_SERVICE_KEY)?);

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind = parse_value(ENV_BIND, &bind)?;
        } else {
            tracing::info!("{ENV_BIND} not set, using default: {}", config.bind);
        }
        if let Some(path) = lookup(ENV_FUNCTION_PATH) {
            config.function_path = path;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout_secs = parse_value(ENV_REQUEST_TIMEOUT, &secs)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| Error::config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Check invariants the router and HTTP clients rely on. Call again
    /// after changing fields by hand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty key, a function path without a
    /// leading `/` or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.service_key.trim().is_empty() {
            return Err(Error::config("service_key must not be empty"));
        }
        if !self.function_path.starts_with('/') {
            return Err(Error::config(format!(
                "function_path must start with '/': {}",
                self.function_path
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::config(format!("invalid {key} value {raw:?}: {e}")))
}
