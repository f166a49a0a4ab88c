// Configuration module entry point
// Loads layered settings and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, ForwarderConfig};

/// Default location of the optional config file (extension resolved by `config`)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Apps Script web app that attaches image links to order rows
const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbzpVKQlv1A5LiCQ7tV9Io17LmNLO9dpihrzDHDdfdiTRs5R5MilSO4Og4tjiTvyKqf-/exec";

impl Config {
    /// Load configuration using the process environment.
    ///
    /// The config file path comes from `--config <path>` or `RELAY_CONFIG`,
    /// and `PORT` overrides `server.port`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let args: Vec<String> = std::env::args().collect();
        let config_path = args
            .iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            .or_else(|| std::env::var("RELAY_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        Self::load_from(&config_path, std::env::var("PORT").ok().as_deref())
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str, port: Option<&str>) -> Result<Self, config::ConfigError> {
        let port = port
            .map(|p| {
                p.trim().parse::<u16>().map_err(|e| {
                    config::ConfigError::Message(format!("Invalid PORT value '{p}': {e}"))
                })
            })
            .transpose()?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3025)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.public_prefix", "/files")?
            .set_default("storage.field_name", "image")?
            .set_default("forwarder.endpoint_url", DEFAULT_ENDPOINT_URL)?
            .set_default("forwarder.timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 0)?
            .set_default("http.server_name", "attach-relay")?
            .set_default("http.enable_cors", false)?
            .set_default("http.trust_proxy", false)?
            .set_override_option("server.port", port.map(i64::from))?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the server cannot run with
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message(
                "server.port must be non-zero".to_string(),
            ));
        }
        if !self.storage.public_prefix.starts_with('/') || self.storage.public_prefix.len() < 2 {
            return Err(config::ConfigError::Message(format!(
                "storage.public_prefix must start with '/' and name a path, got '{}'",
                self.storage.public_prefix
            )));
        }
        if self.storage.field_name.is_empty() {
            return Err(config::ConfigError::Message(
                "storage.field_name must not be empty".to_string(),
            ));
        }
        url::Url::parse(&self.forwarder.endpoint_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "forwarder.endpoint_url '{}' is not a valid URL: {e}",
                self.forwarder.endpoint_url
            ))
        })?;
        if self.forwarder.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "forwarder.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.forwarder.max_in_flight == Some(0) {
            return Err(config::ConfigError::Message(
                "forwarder.max_in_flight must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Public prefix without its trailing slash, e.g. `/files`
    pub fn public_prefix(&self) -> &str {
        self.storage.public_prefix.trim_end_matches('/')
    }
}
