// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub forwarder: ForwarderConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Local upload storage
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory receiving uploaded files, also served publicly
    pub upload_dir: String,
    /// URL prefix under which `upload_dir` is served (e.g. `/files`)
    pub public_prefix: String,
    /// Multipart field carrying the file; also the stored filename's leading tag
    pub field_name: String,
}

/// Outbound webhook settings
#[derive(Debug, Deserialize, Clone)]
pub struct ForwarderConfig {
    pub endpoint_url: String,
    /// Deadline for a single forward call, in seconds
    pub timeout_secs: u64,
    /// Upper bound on simultaneous forward calls (unbounded if not set)
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a connection may stay open; 0 disables the deadline
    pub connection_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    /// Honour `X-Forwarded-Proto` / `X-Forwarded-Host` when building public URLs
    pub trust_proxy: bool,
}
