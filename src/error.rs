//! Startup error type
//!
//! Everything that can stop the server before it accepts its first connection.
//! Request-level failures never surface here: they are mapped to HTTP statuses.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("root directory '{}' is not usable: {source}", path.display())]
    Root { path: PathBuf, source: io::Error },

    #[error("root '{}' is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("failed to open log file: {0}")]
    Logger(io::Error),

    #[error("failed to build runtime: {0}")]
    Runtime(io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
}
