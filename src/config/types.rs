// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
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

/// The served directory and how it is exposed
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Directory whose contents are served; nothing outside it is ever exposed
    pub root: PathBuf,
    /// File names tried, in order, when a directory is requested
    pub index_files: Vec<String>,
    /// Generate an HTML listing for directories without an index file (403 otherwise)
    pub directory_listing: bool,
    /// Status used for trailing-slash redirects (301 or 308)
    pub redirect_code: u16,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/www/"),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
            redirect_code: 301,
        }
    }
}

/// Log verbosity, ordered from quietest to noisiest
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Access log line layout
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogFormat {
    /// Apache/Nginx combined format
    Combined,
    /// Common Log Format
    Common,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    pub access_log_format: AccessLogFormat,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send request headers
    pub header_read_timeout: u64,
    /// Seconds a connection may go without reading or writing anything
    pub connection_timeout: u64,
    pub max_connections: Option<u64>,
    /// Bytes read from disk per body frame
    pub chunk_size: usize,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}
