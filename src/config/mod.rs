// Configuration module entry point
// Layered loading: optional config file, CANNED_* environment, compiled-in defaults

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

impl Config {
    /// Load configuration from specified file path (without extension).
    /// A missing file is not an error; defaults and environment overrides
    /// still apply, so the responder runs with zero configuration.
    ///
    /// Environment keys use `__` between sections, e.g.
    /// `CANNED_SERVER__PORT=8080` overrides `server.port`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CANNED")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "::")?
            .set_default("server.port", 6007)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.content_type", "text/plain; charset=utf-8")?
            .set_default("http.server_name", "canned/0.1")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format_addr(&self.server.host, self.server.port)
    }
}

/// Render host and port as a parseable address, bracketing bare IPv6 hosts
/// so the default "::" works
fn format_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let rendered = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    rendered
        .parse()
        .map_err(|e| format!("Invalid address '{rendered}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // load_from reads the process environment, so tests that call it (or
    // mutate CANNED_* variables) take this lock to avoid cross-talk.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_apply_without_config_file() {
        let _env = ENV_LOCK.lock().unwrap();
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.server.host, "::");
        assert_eq!(cfg.server.port, 6007);
        assert!(cfg.server.workers.is_none());
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.keep_alive_timeout, 75);
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(cfg.http.content_type, "text/plain; charset=utf-8");
        assert_eq!(cfg.http.server_name, "canned/0.1");
    }

    #[test]
    fn test_missing_rules_key_installs_builtin_table() {
        let _env = ENV_LOCK.lock().unwrap();
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.rules.len(), 2);
        assert_eq!(cfg.rules[0].match_rule.path.as_deref(), Some("/"));
        assert_eq!(cfg.rules[0].respond.body, "Main page");
        assert_eq!(cfg.rules[1].match_rule.path.as_deref(), Some("/about"));
        assert_eq!(cfg.rules[1].respond.body, "About this project");
    }

    #[test]
    fn test_env_override_reaches_nested_keys() {
        let _env = ENV_LOCK.lock().unwrap();
        std::env::set_var("CANNED_SERVER__PORT", "9999");
        std::env::set_var("CANNED_LOGGING__ACCESS_LOG_FORMAT", "json");
        let loaded = Config::load_from("no-such-config-file");
        std::env::remove_var("CANNED_SERVER__PORT");
        std::env::remove_var("CANNED_LOGGING__ACCESS_LOG_FORMAT");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.server.port, 9999);
        assert_eq!(cfg.logging.access_log_format, "json");
        // untouched keys keep their defaults
        assert_eq!(cfg.server.host, "::");
    }

    #[test]
    fn test_format_addr_brackets_ipv6() {
        assert_eq!(format_addr("::", 6007).unwrap().to_string(), "[::]:6007");
        assert_eq!(
            format_addr("::1", 6007).unwrap().to_string(),
            "[::1]:6007"
        );
        assert_eq!(
            format_addr("127.0.0.1", 8080).unwrap().to_string(),
            "127.0.0.1:8080"
        );
        assert!(format_addr("not an address", 1).is_err());
    }

    #[test]
    fn test_documented_config_format_parses() {
        // mirrors the shipped config.toml
        let sample = r#"
            [server]
            host = "127.0.0.1"
            port = 6007

            [logging]
            level = "info"
            access_log = true
            show_headers = false
            access_log_format = "json"

            [performance]
            keep_alive_timeout = 75
            read_timeout = 30
            write_timeout = 30
            max_connections = 1024

            [http]
            content_type = "text/plain; charset=utf-8"
            server_name = "canned/0.1"

            [[rules]]
            name = "main-page"
            match = { path = "/" }
            respond = { code = 200, body = "Main page" }

            [[rules]]
            name = "about"
            match = { path = "/about" }
            respond = { code = 200, body = "About this project" }

            [[rules]]
            name = "maintenance"
            respond = { code = 503, body = "Down for maintenance" }
        "#;

        let cfg: Config = toml::from_str(sample).expect("sample config must parse");
        assert_eq!(cfg.rules.len(), 3);
        assert_eq!(cfg.rules[1].name.as_deref(), Some("about"));
        assert_eq!(cfg.rules[1].respond.body, "About this project");
        // a rule with no match block is a catch-all
        assert!(cfg.rules[2].match_rule.path.is_none());
        assert_eq!(cfg.rules[2].respond.code, 503);
        assert_eq!(cfg.performance.max_connections, Some(1024));
    }

    #[test]
    fn test_configured_rules_replace_builtin_table() {
        let sample = r#"
            [server]
            host = "::"
            port = 6007

            [logging]
            level = "info"
            access_log = false
            show_headers = false

            [performance]
            keep_alive_timeout = 75
            read_timeout = 30
            write_timeout = 30

            [http]
            content_type = "text/plain; charset=utf-8"
            server_name = "canned/0.1"

            [[rules]]
            match = { path = "/only" }
            respond = { code = 200, body = "only" }
        "#;

        let cfg: Config = toml::from_str(sample).expect("sample config must parse");
        assert_eq!(cfg.rules.len(), 1);
        assert_eq!(cfg.rules[0].match_rule.path.as_deref(), Some("/only"));
    }
}
