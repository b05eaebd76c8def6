//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to the
//! static site, common headers and access logging.

use crate::config::AppState;
use crate::http::{self, ServeBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw, still percent-encoded path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ServeBody>, Infallible> {
    let started = Instant::now();
    // Request bodies are never read
    let (parts, _) = req.into_parts();

    let mut response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: parts.uri.path(),
                query: parts.uri.query(),
                is_head: parts.method == Method::HEAD,
            };
            state.site.serve(&ctx).await
        }
    };

    if let Some(server) = &state.server_header {
        response.headers_mut().insert(SERVER, server.clone());
    }

    if state.config.logging.access_log {
        let entry = access_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Only GET and HEAD reach the file system
fn check_http_method(method: &Method) -> Option<Response<ServeBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn access_entry(
    req: &Parts,
    response: &Response<ServeBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = match req.version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HttpConfig};
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::StatusCode;

    fn state_for(root: &std::path::Path) -> Arc<AppState> {
        let mut cfg = Config::load_from("this-config-file-does-not-exist").unwrap();
        cfg.site.root = root.to_path_buf();
        cfg.logging.access_log = false;
        cfg.http = HttpConfig {
            server_name: "dirserve-test".to_string(),
        };
        Arc::new(AppState::new(cfg).unwrap())
    }

    fn request(method: Method, uri: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Empty::new())
            .unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_sets_server_header() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        let state = state_for(dir.path());

        let resp = handle_request(request(Method::GET, "/a.txt"), state, peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[SERVER], "dirserve-test");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"abc");
    }

    #[tokio::test]
    async fn test_post_is_405() {
        let dir = tempfile::tempdir().unwrap();
        let resp = handle_request(request(Method::POST, "/"), state_for(dir.path()), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_is_204() {
        let dir = tempfile::tempdir().unwrap();
        let resp = handle_request(request(Method::OPTIONS, "/"), state_for(dir.path()), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
