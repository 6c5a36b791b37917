//! Application configuration.
//!
//! Sections map onto the TOML file the server loads at startup:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [logging]
//! level = "info"
//!
//! [authz]
//! permit_all = ["/healthz"]
//!
//! [users]
//! alice = ["products.update"]
//! ```
//!
//! Every value can be overridden from the environment, e.g.
//! `ROUTEGUARD__SERVER__PORT=9090`.

use std::net::SocketAddr;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use routeguard_authz::AuthzConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Authorization rules and permission cache settings.
    pub authz: AuthzConfig,

    /// Static user to permission assignments served by the bundled store.
    pub users: IndexMap<String, Vec<String>>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on request handling time before a 408 is returned.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_body_limit_bytes() -> usize {
    1_048_576
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level or an env-filter directive string.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Socket address to bind, from `server.host` and `server.port`.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message describing the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.trim().is_empty() {
            return Err("server.host must not be empty".to_string());
        }
        if self.server.request_timeout.is_zero() {
            return Err("server.request_timeout must be positive".to_string());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be positive".to_string());
        }

        let level = self.logging.level.trim();
        let known = ["trace", "debug", "info", "warn", "error", "off"];
        let is_directive = level.contains('=') || level.contains(',');
        if level.is_empty() || (!is_directive && !known.contains(&level.to_lowercase().as_str())) {
            return Err(format!("logging.level '{level}' is not a recognized level"));
        }

        if self.users.keys().any(|user| user.trim().is_empty()) {
            return Err("users keys must not be empty".to_string());
        }

        self.authz.validate().map_err(|e| format!("authz: {e}"))?;
        Ok(())
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Load configuration from a TOML file (when present) plus
    /// `ROUTEGUARD__`-prefixed environment overrides, then validate it.
    ///
    /// # Errors
    ///
    /// Returns a message describing the build, deserialization, or
    /// validation failure.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("routeguard.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g. ROUTEGUARD__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("ROUTEGUARD")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

// =============================================================================
// Tests
// =============================================================================
