// Configuration module entry point
// Loads the immutable startup configuration and builds shared application state

mod state;
mod types;

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::error::ConfigError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Variables kept for deployments that configure the wiki without the `WIKI__` prefix
const LEGACY_PREFIX_VAR: &str = "APPLICATION_PREFIX";
const LEGACY_PORT_VARS: [&str; 2] = ["ASPNETCORE_PORT", "PORT"];

/// Load `.env` from the working directory into the process environment.
///
/// A missing file is not an error; a malformed one is.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl Config {
    /// Load configuration from the default file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(DEFAULT_CONFIG_PATH, None)
    }

    /// Load configuration from the given file path (without extension).
    ///
    /// When `vars` is `Some`, it replaces the process environment as the
    /// source of environment variables.
    pub fn load_with(
        config_path: &str,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let lookup = |name: &str| match &vars {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        let legacy_prefix = lookup(LEGACY_PREFIX_VAR);
        let legacy_port = LEGACY_PORT_VARS.iter().find_map(|name| lookup(name));

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WIKI")
                    .separator("__")
                    .source(vars.clone()),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("application.prefix", "")?
            .set_default("application.pages_dir", "pages")?
            .set_default("application.templates_dir", "templates")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default(
                "http.server_name",
                concat!("rust_wiki/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_override_option("application.prefix", legacy_prefix)?
            .set_override_option("server.port", legacy_port)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values the deserializer cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.application.prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "application.prefix must start with '/': '{prefix}'"
            )));
        }
        if prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "application.prefix must not end with '/': '{prefix}'"
            )));
        }
        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug"
        ) {
            return Err(ConfigError::Invalid(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }
        if !matches!(
            self.logging.access_log_format.as_str(),
            "combined" | "common" | "json"
        ) {
            return Err(ConfigError::Invalid(format!(
                "unknown logging.access_log_format '{}'",
                self.logging.access_log_format
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid address: {e}")))
    }
}
