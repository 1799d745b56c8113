// Server loop module
// Accept loop with shutdown and config-reload arms

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::{AppState, Config};
use crate::dispatch;
use crate::logger;

/// Signals and settings steering the accept loop
pub struct ServerLoopConfig {
    /// Breaks the loop; the caller then drains in-flight connections
    pub shutdown: Arc<Notify>,
    /// Re-reads the config file and swaps the dispatch table
    pub reload: Arc<Notify>,
    /// Config file path (without extension) re-read on reload
    pub config_path: String,
}

/// Run the accept loop until shutdown is requested.
///
/// Every arm stays cheap: accepted streams are handed to spawned tasks
/// immediately, a reload re-reads the config inline (no requests are
/// being accepted during the swap, which keeps the table change atomic
/// from the connections' point of view), and the shutdown arm breaks the
/// loop so in-flight connections can drain.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    config: ServerLoopConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = config.reload.notified() => {
                reload_config(&state, &config.config_path).await;
            }

            _ = config.shutdown.notified() => {
                logger::log_shutdown_requested();
                break;
            }
        }
    }

    drain_connections(&active_connections).await;
    Ok(())
}

/// Re-read the config file and swap the dispatch table and logging options.
/// A config that fails to load or validate leaves the current one running.
async fn reload_config(state: &Arc<AppState>, config_path: &str) {
    logger::log_reload_triggered();

    let new_config = match Config::load_from(config_path) {
        Ok(c) => c,
        Err(e) => {
            logger::log_reload_failed(&format!("Config load failed: {e}"));
            return;
        }
    };

    if let Err(e) = dispatch::validate_rules(&new_config.rules) {
        logger::log_reload_failed(&format!("Rule table rejected: {e}"));
        return;
    }

    for warning in startup_only_changes(&state.config, &new_config) {
        logger::log_warning(warning);
    }

    if let Err(e) = logger::retarget(&new_config) {
        logger::log_reload_failed(&format!("Log files not writable: {e}"));
        return;
    }

    state.apply_reload(&new_config).await;
    logger::log_reload_applied(new_config.rules.len());
}

/// Warnings for config changes a reload cannot apply. The listener, the
/// runtime and the per-connection settings are wired at startup; only the
/// rule table and the logging options swap on reload.
fn startup_only_changes(current: &Config, incoming: &Config) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if incoming.server.host != current.server.host
        || incoming.server.port != current.server.port
    {
        warnings.push(
            "server.host/server.port changed; a restart is needed, keeping the current listener",
        );
    }
    if incoming.server.workers != current.server.workers {
        warnings.push("server.workers changed; a restart is needed");
    }

    let old = &current.performance;
    let new = &incoming.performance;
    if new.keep_alive_timeout != old.keep_alive_timeout
        || new.read_timeout != old.read_timeout
        || new.write_timeout != old.write_timeout
    {
        warnings.push("performance timeouts changed; a restart is needed");
    }
    if new.max_connections != old.max_connections {
        warnings.push("performance.max_connections changed; a restart is needed");
    }

    warnings
}

/// Give in-flight connections a short window to finish after shutdown
async fn drain_connections(active_connections: &Arc<AtomicUsize>) {
    const DRAIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
    const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);

    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    loop {
        let remaining = active_connections.load(std::sync::atomic::Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            logger::log_drain_complete(remaining);
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_startup_only_changes_cover_performance_settings() {
        let current = Config::load_from("no-such-config-file").unwrap();
        let mut incoming = current.clone();
        assert!(startup_only_changes(&current, &incoming).is_empty());

        incoming.server.port = current.server.port + 1;
        incoming.performance.read_timeout = current.performance.read_timeout + 1;
        incoming.performance.max_connections = Some(10);
        let warnings = startup_only_changes(&current, &incoming);
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .any(|w| w.contains("server.host/server.port")));
        assert!(warnings.iter().any(|w| w.contains("timeouts")));
        assert!(warnings.iter().any(|w| w.contains("max_connections")));
    }

    #[tokio::test]
    async fn test_shutdown_breaks_the_loop_and_drains() {
        let config = Config::load_from("no-such-config-file").unwrap();
        let state = Arc::new(AppState::new(&config));
        let listener = super::super::listener::create_listener("127.0.0.1:0".parse().unwrap())
            .unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());
        let reload = Arc::new(Notify::new());

        let task = tokio::spawn(start_server_loop(
            listener,
            state,
            Arc::clone(&active),
            ServerLoopConfig {
                shutdown: Arc::clone(&shutdown),
                reload,
                config_path: "no-such-config-file".to_string(),
            },
        ));

        // notify_one stores a permit, so this wakes the loop even if it
        // has not reached select yet
        shutdown.notify_one();

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), task)
            .await
            .expect("loop must stop after shutdown")
            .unwrap();
        assert!(result.is_ok());
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loop_serves_a_request_end_to_end() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let config = Config::load_from("no-such-config-file").unwrap();
        let state = Arc::new(AppState::new(&config));
        let listener = super::super::listener::create_listener("127.0.0.1:0".parse().unwrap())
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());
        let reload = Arc::new(Notify::new());

        let task = tokio::spawn(start_server_loop(
            listener,
            state,
            active,
            ServerLoopConfig {
                shutdown: Arc::clone(&shutdown),
                reload,
                config_path: "no-such-config-file".to_string(),
            },
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /about HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8_lossy(&raw);
        assert!(text.starts_with("HTTP/1.1 200"), "got: {text}");
        assert!(text.ends_with("About this project"), "got: {text}");

        shutdown.notify_one();
        tokio::time::timeout(std::time::Duration::from_secs(2), task)
            .await
            .expect("loop must stop after shutdown")
            .unwrap()
            .unwrap();
    }
}
