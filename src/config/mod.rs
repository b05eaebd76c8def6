// Configuration module entry point
// Loads, validates and exposes the immutable server configuration

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    AccessLogFormat, Config, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig,
    ServerConfig, SiteConfig,
};

/// Config file used when none is named on the command line
pub const DEFAULT_CONFIG_PATH: &str = "dirserve";

const ENV_PREFIX: &str = "DIRSERVE";

impl Config {
    /// Load configuration from the default file name (`dirserve.toml`, optional)
    pub fn load() -> Result<Self, StartupError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (extension optional).
    /// Missing files are fine; every key has a default and `DIRSERVE_*`
    /// environment variables override the file.
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("site.root", "/www/")?
            .set_default("site.index_files", vec!["index.html", "index.htm"])?
            .set_default("site.directory_listing", true)?
            .set_default("site.redirect_code", 301)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 10)?
            .set_default("performance.connection_timeout", 300)?
            .set_default("performance.chunk_size", 65_536)? // 64KiB
            .set_default(
                "http.server_name",
                concat!("dirserve/", env!("CARGO_PKG_VERSION")),
            )?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), StartupError> {
        self.get_socket_addr()?;

        if !matches!(self.site.redirect_code, 301 | 308) {
            return Err(StartupError::Invalid(format!(
                "site.redirect_code must be 301 or 308, got {}",
                self.site.redirect_code
            )));
        }
        if let Some(name) = self
            .site
            .index_files
            .iter()
            .find(|n| n.is_empty() || n.contains(['/', '\\']) || *n == "." || *n == "..")
        {
            return Err(StartupError::Invalid(format!(
                "site.index_files entry '{name}' is not a plain file name"
            )));
        }
        if self.server.workers == Some(0) {
            return Err(StartupError::Invalid(
                "server.workers must be greater than zero".to_string(),
            ));
        }
        if self.performance.chunk_size == 0 {
            return Err(StartupError::Invalid(
                "performance.chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::Address { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.site, SiteConfig::default());
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Combined);
        assert!(cfg.performance.keep_alive);
        assert_eq!(cfg.performance.chunk_size, 65_536);
        assert!(cfg.http.server_name.starts_with("dirserve/"));
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:8080".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 9090

[site]
root = "/srv/files"
index_files = ["default.htm"]
directory_listing = false
redirect_code = 308

[logging]
level = "debug"
access_log_format = "json"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 9090);
        assert_eq!(cfg.site.root, std::path::PathBuf::from("/srv/files"));
        assert_eq!(cfg.site.index_files, vec!["default.htm".to_string()]);
        assert!(!cfg.site.directory_listing);
        assert_eq!(cfg.site.redirect_code, 308);
        assert_eq!(cfg.logging.level, LogLevel::Debug);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_redirect_code() {
        let mut cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        cfg.site.redirect_code = 302;
        assert!(matches!(cfg.validate(), Err(StartupError::Invalid(_))));
    }

    #[test]
    fn test_rejects_index_with_separator() {
        let mut cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        cfg.site.index_files = vec!["../secret.html".to_string()];
        assert!(matches!(cfg.validate(), Err(StartupError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_host() {
        let mut cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        cfg.server.host = "not an address".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(StartupError::Address { .. })
        ));
    }
}
