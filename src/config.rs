//! Gatekeeper Configuration
//!
//! Settings come from defaults, then the process environment (with an
//! optional `.env` file), then command line flags.
//!
//! | Variable                 | Default   |
//! |--------------------------|-----------|
//! | `GATEKEEPER_HOST`        | `0.0.0.0` |
//! | `GATEKEEPER_PORT`        | `8000`    |
//! | `GATEKEEPER_LOG_LEVEL`   | `info`    |
//! | `GATEKEEPER_LOG_JSON`    | `false`   |
//! | `GATEKEEPER_LOG_DIR`     | unset     |
//! | `GATEKEEPER_SEED_DATA`   | `true`    |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{GatekeeperError, GatekeeperResult};

pub const ENV_HOST: &str = "GATEKEEPER_HOST";
pub const ENV_PORT: &str = "GATEKEEPER_PORT";
pub const ENV_LOG_LEVEL: &str = "GATEKEEPER_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "GATEKEEPER_LOG_JSON";
pub const ENV_LOG_DIR: &str = "GATEKEEPER_LOG_DIR";
pub const ENV_SEED_DATA: &str = "GATEKEEPER_SEED_DATA";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Directory for daily-rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            log_dir: None,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Start the collections with demo rows
    #[serde(default = "default_seed_data")]
    pub seed_data: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_seed_data() -> bool {
    true
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            seed_data: default_seed_data(),
        }
    }
}

impl GatekeeperConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> GatekeeperResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(GatekeeperError::InvalidConfig(format!(".env: {}", err))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a dotenv-style file only, ignoring the process environment
    pub fn from_env_file(path: impl AsRef<Path>) -> GatekeeperResult<Self> {
        let path = path.as_ref();
        let invalid = |err: dotenvy::Error| {
            GatekeeperError::InvalidConfig(format!("{}: {}", path.display(), err))
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(invalid)? {
            let (key, value) = item.map_err(invalid)?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> GatekeeperResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port.trim().parse().map_err(|_| {
                GatekeeperError::InvalidConfig(format!("{} must be a port number, got '{}'", ENV_PORT, port))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|l| !l.trim().is_empty()) {
            config.logging.level = level.trim().to_string();
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            config.logging.json = parse_bool(ENV_LOG_JSON, &json)?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|d| !d.trim().is_empty()) {
            config.logging.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(seed) = lookup(ENV_SEED_DATA) {
            config.seed_data = parse_bool(ENV_SEED_DATA, &seed)?;
        }

        Ok(config)
    }

    /// Set the bind host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Enable or disable demo rows
    pub fn with_seed_data(mut self, seed_data: bool) -> Self {
        self.seed_data = seed_data;
        self
    }

    /// `host:port` for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(key: &str, value: &str) -> GatekeeperResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatekeeperError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
