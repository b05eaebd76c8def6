// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish after shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop on `listener` until `shutdown` completes.
///
/// Accept errors (e.g. descriptor exhaustion) are logged and the loop keeps
/// going after a short pause. After shutdown the listener is closed at once;
/// open connections get `SHUTDOWN_GRACE` to complete.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(DRAIN_POLL).await;
                    }
                }
            }

            _ = &mut shutdown => {
                break;
            }
        }
    }

    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    while active_connections.load(Ordering::SeqCst) > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
