//! Configuration management for the rewards admin console
//!
//! Settings come from an optional `rewards-admin.toml` file and from
//! `REWARDS_ADMIN_*` environment variables, with nested keys separated by a
//! double underscore (`REWARDS_ADMIN_API__BASE_URL`). The API base URL and the
//! identity provider key have no defaults and must be supplied externally.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "REWARDS_ADMIN";

/// Default configuration file name (extension resolved by the loader)
pub const DEFAULT_CONFIG_FILE: &str = "rewards-admin";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    pub api: ApiConfig,

    /// Identity provider and session configuration
    pub auth: AuthConfig,

    /// Console behaviour
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `https://api.example.com/api`
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider publishable key
    pub publishable_key: String,

    /// Role claim an operator must carry to use the console
    #[serde(default = "default_required_role")]
    pub required_role: String,

    /// Pre-issued session token, used by the CLI in place of an interactive sign-in
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

/// Console behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Quiet period before a search keystroke is committed
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_required_role() -> String {
    "super_admin".to_string()
}

const fn default_search_debounce_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Build a configuration from the two externally supplied values, with
    /// every other setting at its default
    #[must_use]
    pub fn new(base_url: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                request_timeout_secs: default_request_timeout(),
            },
            auth: AuthConfig {
                publishable_key: publishable_key.into(),
                required_role: default_required_role(),
                token: None,
            },
            console: ConsoleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from the default file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file (or the default file when
    /// `None`), overlaid with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid setting.
    pub fn validate(&self) -> crate::Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(crate::Error::configuration(format!(
                "api.base_url must be an http(s) URL, got '{base_url}'"
            )));
        }
        if self.auth.publishable_key.trim().is_empty() {
            return Err(crate::Error::configuration(
                "auth.publishable_key must be supplied",
            ));
        }
        if self.auth.required_role.trim().is_empty() {
            return Err(crate::Error::configuration("auth.required_role is empty"));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(crate::Error::configuration(format!(
                "logging.format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}
