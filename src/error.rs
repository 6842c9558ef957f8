//! Startup error types

use thiserror::Error;

/// Errors that can stop the server from starting
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Host/port pair does not form a socket address
    #[error("Invalid address: {0}")]
    Address(String),

    /// Socket or file I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Certificate or private key could not be used
    #[error("TLS error: {0}")]
    Tls(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
