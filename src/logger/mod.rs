//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - The per-response log line
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        LogLevel::from_name(&config.logging.level),
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to the info target regardless of level
fn write_always(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_warning(message: &str) {
    match writer::get() {
        Some(w) => w.write_warning(message),
        None => eprintln!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(config: &Config, routes: &[&str]) {
    write_info("======================================");
    write_info("Server starting");
    write_info(&format!("Environment: {}", config.server.env_name));
    write_info(&format!("Log level: {}", config.logging.level));
    write_info(&format!("Max body size: {} bytes", config.http.max_body_size));
    write_info(&format!("Routes: {}", routes.join(", ")));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_listening(scheme: &str, addr: &SocketAddr) {
    write_info(&format!("The server is listening on {scheme}://{addr}"));
}

pub fn log_tls_disabled(key_path: &str, cert_path: &str) {
    write_info(&format!(
        "[TLS] {key_path} or {cert_path} not found, HTTPS listener disabled"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr, scheme: &str) {
    write_info(&format!("[Connection] Accepted {scheme} from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

/// Final status and serialized body of every response
pub fn log_response(status: u16, body: &str) {
    write_always(&format!("Returning this response: {status} {body}"));
}

pub fn log_shutdown() {
    write_info("[Shutdown] Signal received, no longer accepting connections");
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warning(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_always(&entry.format(format));
}
