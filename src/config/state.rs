// Application state module
// Everything a connection needs, built once at startup and shared read-only

use hyper::header::HeaderValue;

use super::types::Config;
use crate::error::StartupError;
use crate::handler::StaticSite;

/// Application state
pub struct AppState {
    pub config: Config,
    pub site: StaticSite,
    /// Precomputed `Server` header; `None` if the configured name is not a valid header value
    pub server_header: Option<HeaderValue>,
}

impl AppState {
    /// Validates the root directory; fails if it cannot be served
    pub fn new(config: Config) -> Result<Self, StartupError> {
        let site = StaticSite::new(&config.site, config.performance.chunk_size)?;
        let server_header = HeaderValue::from_str(&config.http.server_name).ok();
        Ok(Self {
            config,
            site,
            server_header,
        })
    }
}
