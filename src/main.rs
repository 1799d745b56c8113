use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use canned::config::{AppState, Config};
use canned::dispatch;
use canned::logger;
use canned::server::{
    create_listener, start_server_loop, start_signal_handler, ServerLoopConfig, SignalHandler,
};

/// Config file path without extension; resolves to `config.toml` in the
/// working directory when present
const CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cfg = Config::load_from(CONFIG_PATH)?;
    dispatch::validate_rules(&cfg.rules)?;

    // Build the Tokio runtime, sizing the thread pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logger::init(&cfg)?;

    let addr = cfg.get_socket_addr()?;
    let listener = create_listener(addr)?;

    let state = Arc::new(AppState::new(&cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &cfg, cfg.rules.len());

    let signals = Arc::new(SignalHandler::new());
    start_signal_handler(Arc::clone(&signals))?;

    start_server_loop(
        listener,
        state,
        active_connections,
        ServerLoopConfig {
            shutdown: Arc::clone(&signals.shutdown),
            reload: Arc::clone(&signals.reload),
            config_path: CONFIG_PATH.to_string(),
        },
    )
    .await
}
