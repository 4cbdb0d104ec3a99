//! Service configuration: remote roots, timeouts and logging.
//!
//! Loaded from YAML or from `MR_*` environment variables (a `.env` file is
//! honored). The configuration is an explicit value handed to the
//! endpoint resolver and transport; nothing reads it from globals.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MrError, MrResult};

pub const DEFAULT_GEOSERVER_ROOT: &str = "https://geo.vliz.be/geoserver";
pub const DEFAULT_REST_ROOT: &str = "https://www.marineregions.org/rest";

/// Remote service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Geoserver root; WMS/WFS endpoints live at `<root>/<namespace>/...`
    #[serde(default = "default_geoserver_root")]
    pub geoserver_root: String,

    /// Gazetteer REST root
    #[serde(default = "default_rest_root")]
    pub rest_root: String,

    /// Upper bound on a whole request, including body transfer
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on connection establishment
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_geoserver_root() -> String {
    DEFAULT_GEOSERVER_ROOT.to_string()
}

fn default_rest_root() -> String {
    DEFAULT_REST_ROOT.to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("mregions/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            geoserver_root: default_geoserver_root(),
            rest_root: default_rest_root(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> MrResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MrError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> MrResult<Self> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)?;
        config.normalized()
    }

    /// Load configuration from `MR_*` environment variables, reading `.env` first.
    pub fn from_env() -> MrResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> MrResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            geoserver_root: lookup("MR_GEOSERVER_ROOT").unwrap_or(defaults.geoserver_root),
            rest_root: lookup("MR_REST_ROOT").unwrap_or(defaults.rest_root),
            request_timeout_secs: parse_var(
                &lookup,
                "MR_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            connect_timeout_secs: parse_var(
                &lookup,
                "MR_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            user_agent: lookup("MR_USER_AGENT").unwrap_or(defaults.user_agent),
            logging: LoggingConfig {
                level: lookup("MR_LOG_LEVEL").unwrap_or(defaults.logging.level),
                json: lookup("MR_LOG_JSON")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(defaults.logging.json),
            },
        };

        config.normalized()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Trim trailing slashes from the service roots and reject settings no
    /// client can run with. Every loader applies this; call it on a
    /// hand-built value.
    pub fn normalized(mut self) -> MrResult<Self> {
        self.geoserver_root = self.geoserver_root.trim_end_matches('/').to_string();
        self.rest_root = self.rest_root.trim_end_matches('/').to_string();

        if self.geoserver_root.is_empty() || self.rest_root.is_empty() {
            return Err(MrError::Config("Service roots must not be empty".to_string()));
        }
        // Every network call needs a bounded timeout.
        if self.request_timeout_secs == 0 {
            return Err(MrError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(MrError::Config(
                "connect_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

fn parse_var<F>(lookup: &F, key: &str, default: u64) -> MrResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| MrError::Config(format!("{} must be an integer, got '{}'", key, raw))),
        None => Ok(default),
    }
}
