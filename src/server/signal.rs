// Signal handling module (nginx-style)
//
// Supported signals:
// - SIGHUP:  Reload configuration (rule table, logging)
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Arc<Notify>,
    /// Reload signal (SIGHUP)
    pub reload: Arc<Notify>,
    /// Whether shutdown has been requested
    pub shutdown_requested: Arc<AtomicBool>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            reload: Arc::new(Notify::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the signal task (Unix only)
///
/// Registers the signal handlers, then spawns a background task that
/// forwards received signals to the accept loop through the handler's
/// notifiers. Registration errors are returned so startup can fail fast.
///
/// # Signals
///
/// | Signal  | Action           | Nginx Equivalent |
/// |---------|------------------|------------------|
/// | SIGHUP  | Reload config    | `nginx -s reload`|
/// | SIGTERM | Graceful stop    | `nginx -s stop`  |
/// | SIGINT  | Graceful stop    | Ctrl+C           |
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    logger::log_signal(&format!(
        "Handlers registered (pid {}): SIGHUP reload, SIGTERM/SIGINT shutdown",
        std::process::id()
    ));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                // SIGHUP: Reload configuration (like nginx -s reload)
                _ = sighup.recv() => {
                    logger::log_signal("SIGHUP received, reloading configuration");
                    handler.reload.notify_one();
                }

                // SIGTERM: Graceful shutdown
                _ = sigterm.recv() => {
                    logger::log_signal("SIGTERM received, initiating graceful shutdown");
                    handler.shutdown_requested.store(true, Ordering::SeqCst);
                    // notify_one stores a permit, so the accept loop sees the
                    // signal even if it is not parked in select right now
                    handler.shutdown.notify_one();
                    break;
                }

                // SIGINT: Graceful shutdown (Ctrl+C)
                _ = sigint.recv() => {
                    logger::log_signal("SIGINT received, initiating graceful shutdown");
                    handler.shutdown_requested.store(true, Ordering::SeqCst);
                    handler.shutdown.notify_one();
                    break;
                }
            }
        }
    });

    Ok(())
}

/// Windows fallback - only handles Ctrl+C. Registration there happens
/// lazily inside the task, so this never returns an error itself.
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)] // signature matches the unix variant
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    tokio::spawn(async move {
        logger::log_signal("Windows mode: only Ctrl+C is supported, reload is unavailable");

        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_signal("Ctrl+C received, initiating graceful shutdown");
                handler.shutdown_requested.store(true, Ordering::SeqCst);
                handler.shutdown.notify_one();
            }
            Err(e) => logger::log_error(&format!("Ctrl+C listener failed: {e}")),
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_starts_without_shutdown_requested() {
        let handler = SignalHandler::new();
        assert!(!handler.shutdown_requested.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_registration_succeeds_inside_runtime() {
        let handler = Arc::new(SignalHandler::new());
        start_signal_handler(handler).expect("signal registration must succeed");
    }

    #[tokio::test]
    async fn test_reload_notify_wakes_a_waiter() {
        let handler = Arc::new(SignalHandler::new());
        let waiter = Arc::clone(&handler);

        let task = tokio::spawn(async move { waiter.reload.notified().await });
        // notify_one stores a permit even if the waiter has not polled yet
        handler.reload.notify_one();

        tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .expect("waiter must wake")
            .unwrap();
    }
}
