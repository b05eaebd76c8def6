//! HTTP response building module
//!
//! Builders for every status the server emits. Error bodies are fixed strings
//! and never mention paths or OS error text.

use hyper::header::{
    HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LOCATION, X_CONTENT_TYPE_OPTIONS,
};
use hyper::{Response, StatusCode};

use super::body::{empty, full, FileBody, ServeBody};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

pub const BODY_400: &str = "400 Bad Request";
pub const BODY_403: &str = "403 Forbidden";
pub const BODY_404: &str = "404 Not Found";
pub const BODY_405: &str = "405 Method Not Allowed";
pub const BODY_500: &str = "500 Internal Server Error";

/// Build a 200 response streaming an open file
pub fn build_file_response(
    file: FileBody,
    len: u64,
    content_type: &str,
    is_head: bool,
) -> Response<ServeBody> {
    let body = if is_head { empty() } else { file.boxed() };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, len)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build generic HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<ServeBody> {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build a permanent redirect (301 or 308) to `location`
pub fn build_redirect_response(location: &str, code: u16, is_head: bool) -> Response<ServeBody> {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::MOVED_PERMANENTLY);
    let Ok(location) = HeaderValue::from_str(location) else {
        crate::logger::log_error("Redirect target is not a valid header value");
        return build_500_response(is_head);
    };

    Response::builder()
        .status(status)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("redirect", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ServeBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            fallback(StatusCode::NO_CONTENT)
        })
}

pub fn build_400_response(is_head: bool) -> Response<ServeBody> {
    build_text_error(StatusCode::BAD_REQUEST, BODY_400, is_head)
}

pub fn build_403_response(is_head: bool) -> Response<ServeBody> {
    build_text_error(StatusCode::FORBIDDEN, BODY_403, is_head)
}

pub fn build_404_response(is_head: bool) -> Response<ServeBody> {
    build_text_error(StatusCode::NOT_FOUND, BODY_404, is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ServeBody> {
    let mut resp = build_text_error(StatusCode::METHOD_NOT_ALLOWED, BODY_405, false);
    resp.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

pub fn build_500_response(is_head: bool) -> Response<ServeBody> {
    build_text_error(StatusCode::INTERNAL_SERVER_ERROR, BODY_500, is_head)
}

fn build_text_error(status: StatusCode, message: &'static str, is_head: bool) -> Response<ServeBody> {
    let body = if is_head { empty() } else { full(message) };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

fn fallback(status: StatusCode) -> Response<ServeBody> {
    let mut resp = Response::new(empty());
    *resp.status_mut() = status;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
