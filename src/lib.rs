//! Minimal JSON API server.
//!
//! Serves `/ping` and `/hello` over plain HTTP, and over HTTPS when a
//! certificate and key are present, plus a few string/crypto helpers.

pub mod config;
pub mod error;
pub mod handler;
pub mod helpers;
pub mod http;
pub mod logger;
pub mod server;

pub use error::{Result, ServerError};
