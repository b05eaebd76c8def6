// Signal handling module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolves once the process is asked to stop.
///
/// If a handler cannot be registered the error is logged and that signal is
/// simply never observed; the default disposition still terminates the process.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            logger::log_error(&format!("Failed to register SIGTERM handler: {e}"));
            None
        }
    };

    let terminate = async {
        match sigterm.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = ctrl_c_or_pending(tokio::signal::ctrl_c()) => logger::log_info("SIGINT received"),
        () = terminate => logger::log_info("SIGTERM received"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c_or_pending(tokio::signal::ctrl_c()).await;
    logger::log_info("Ctrl+C received");
}

/// Completes when Ctrl+C arrives. A listener that fails to register never
/// completes, so the failure cannot be mistaken for a shutdown request.
async fn ctrl_c_or_pending<F>(listen: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listen.await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_ctrl_c_listener_never_completes() {
        let failed = async { Err(std::io::Error::other("no signal driver")) };
        let waited = tokio::time::timeout(Duration::from_millis(50), ctrl_c_or_pending(failed)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_delivered_ctrl_c_completes() {
        let delivered = async { Ok(()) };
        let waited = tokio::time::timeout(Duration::from_millis(50), ctrl_c_or_pending(delivered)).await;
        assert!(waited.is_ok());
    }
}
