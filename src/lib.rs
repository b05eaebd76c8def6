//! dirserve
//!
//! Serves the contents of one directory over plain HTTP/1.1.
//! Request paths are decoded, normalized and confined to the root before any
//! filesystem access; files are streamed from an open handle.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolve;
pub mod server;

pub use error::StartupError;
