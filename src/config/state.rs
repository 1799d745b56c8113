// Application state module
// Startup config plus the pieces a reload may swap at runtime

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{Config, LoggingConfig};
use crate::dispatch::Dispatcher;

/// Application state shared across connections
pub struct AppState {
    /// Startup configuration. Address, worker and timeout settings are
    /// fixed for the life of the process.
    pub config: Config,
    /// Current dispatcher, replaced wholesale on config reload so
    /// in-flight requests keep the table they started with
    pub dispatcher: RwLock<Arc<Dispatcher>>,
    /// Current logging options, replaced on config reload
    pub logging: RwLock<LoggingConfig>,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Create `AppState` from a validated configuration
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            dispatcher: RwLock::new(Arc::new(Dispatcher::new(config.rules.clone()))),
            logging: RwLock::new(config.logging.clone()),
            cached_access_log: AtomicBool::new(config.logging.access_log),
        }
    }

    /// Swap in a freshly loaded configuration.
    /// Only the rule table and logging options take effect here; server
    /// address and worker settings need a restart.
    pub async fn apply_reload(&self, new_config: &Config) {
        {
            let mut dispatcher = self.dispatcher.write().await;
            *dispatcher = Arc::new(Dispatcher::new(new_config.rules.clone()));
        }
        {
            let mut logging = self.logging.write().await;
            *logging = new_config.logging.clone();
        }
        self.update_cache(new_config);
    }

    /// Update cached configuration values
    pub fn update_cache(&self, new_config: &Config) {
        self.cached_access_log
            .store(new_config.logging.access_log, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Rule;

    fn test_config() -> Config {
        Config::load_from("no-such-config-file").unwrap()
    }

    #[tokio::test]
    async fn test_state_starts_with_configured_rules() {
        let state = AppState::new(&test_config());
        let dispatcher = Arc::clone(&*state.dispatcher.read().await);
        assert_eq!(dispatcher.rule_count(), 2);
        assert!(state.cached_access_log.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_reload_swaps_dispatcher_and_logging() {
        let state = AppState::new(&test_config());

        let mut new_config = test_config();
        new_config.rules = vec![Rule::exact("/new", 200, "new")];
        new_config.logging.access_log = false;
        state.apply_reload(&new_config).await;

        let dispatcher = Arc::clone(&*state.dispatcher.read().await);
        assert_eq!(dispatcher.rule_count(), 1);
        assert_eq!(dispatcher.dispatch(&[], "/new", "GET").body, "new");
        assert_eq!(dispatcher.dispatch(&[], "/", "GET").code, 404);
        assert!(!state.cached_access_log.load(Ordering::Relaxed));
        assert!(!state.logging.read().await.access_log);
    }

    #[tokio::test]
    async fn test_reload_does_not_disturb_existing_snapshot() {
        let state = AppState::new(&test_config());
        let before = Arc::clone(&*state.dispatcher.read().await);

        let mut new_config = test_config();
        new_config.rules = Vec::new();
        state.apply_reload(&new_config).await;

        // a snapshot taken before the reload still answers with the old table
        assert_eq!(before.dispatch(&[], "/", "GET").code, 200);
        let after = Arc::clone(&*state.dispatcher.read().await);
        assert_eq!(after.dispatch(&[], "/", "GET").code, 404);
    }
}
