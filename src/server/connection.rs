// Connection handling module
// Accepts one TCP connection and serves it on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use super::idle::IdleTimeout;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Decrements the active connection counter on every exit path
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let guard = ConnectionGuard(Arc::clone(conn_counter));

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    let _ = stream.set_nodelay(true);

    tokio::spawn(serve_connection(stream, peer_addr, Arc::clone(state), guard));
}

/// Serve HTTP/1.1 on one connection until the client is done, the header
/// read timeout fires, or the connection sits idle for `connection_timeout`.
/// Dropping the connection future drops any in-flight body and its file handle.
async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    _guard: ConnectionGuard,
) {
    let perf = &state.config.performance;
    let idle_timeout = Duration::from_secs(perf.connection_timeout);
    let io = TokioIo::new(IdleTimeout::new(stream, idle_timeout));

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(perf.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(Duration::from_secs(perf.header_read_timeout));

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    if let Err(err) = conn.await {
        if is_idle_timeout(&err) {
            logger::log_debug(&format!(
                "Connection from {peer_addr} idle for {} seconds, closed",
                idle_timeout.as_secs()
            ));
        } else {
            logger::log_connection_error(&err);
        }
    }
}

fn is_idle_timeout(err: &hyper::Error) -> bool {
    std::error::Error::source(err)
        .and_then(|e| e.downcast_ref::<std::io::Error>())
        .is_some_and(|e| e.kind() == std::io::ErrorKind::TimedOut)
}
