//! Logger module
//!
//! Provides logging utilities for the responder including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Reload and shutdown progress
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Point the log streams at the paths in a freshly loaded configuration
pub fn retarget(config: &Config) -> std::io::Result<()> {
    if writer::is_initialized() {
        writer::get().retarget(
            config.logging.access_log_file.as_deref(),
            config.logging.error_log_file.as_deref(),
        )
    } else {
        Ok(())
    }
}

/// Write to info/access log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, rule_count: usize) {
    write_info("======================================");
    write_info("canned responder started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    write_info(&format!(
        "Dispatch rules: {rule_count} (405/404 fallbacks not counted)"
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_signal(message: &str) {
    write_info(&format!("[Signal] {message}"));
}

pub fn log_reload_triggered() {
    write_info("\n[Reload] Configuration reload triggered");
}

pub fn log_reload_applied(rule_count: usize) {
    write_info(&format!(
        "[Reload] New configuration applied: {rule_count} dispatch rules"
    ));
}

pub fn log_reload_failed(reason: &str) {
    log_error(&format!("[Reload] {reason}"));
    write_error("         Continuing with current configuration");
}

pub fn log_shutdown_requested() {
    write_info("\n[Shutdown] Stop accepting new connections");
}

pub fn log_drain_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections drained");
    } else {
        write_info(&format!(
            "[Shutdown] Drain deadline reached with {remaining} connections still open"
        ));
    }
}
