// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Result, ServerError};

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, Environment, HttpConfig, LoggingConfig, PerformanceConfig, SecurityConfig,
    ServerConfig, TlsConfig,
};

/// Environment variable selecting the default profile
pub const ENV_SELECTOR: &str = "APP_ENV";

/// Default config file path (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration for the environment named by `APP_ENV`
    pub fn load(config_path: &str) -> Result<Self> {
        let env_name = std::env::var(ENV_SELECTOR).ok();
        Self::load_from(config_path, Environment::from_name(env_name.as_deref()))
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: environment defaults, the config file, then
    /// `SERVER__<section>__<key>` environment variables.
    pub fn load_from(config_path: &str, env: Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.env_name", env.name())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.http_port", i64::from(env.http_port()))?
            .set_default("server.https_port", i64::from(env.https_port()))?
            .set_default("tls.key_path", "./https/key.pem")?
            .set_default("tls.cert_path", "./https/cert.pem")?
            .set_default("security.hashing_secret", env.hashing_secret())?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("http.server_name", "hello_api/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 128)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn http_socket_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.server.host, self.server.http_port)
    }

    pub fn https_socket_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.server.host, self.server.https_port)
    }

    /// Whether both certificate files are present on disk
    pub fn tls_files_present(&self) -> bool {
        Path::new(&self.tls.key_path).exists() && Path::new(&self.tls.cert_path).exists()
    }
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .map_err(|e| ServerError::Address(format!("{host}:{port}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_FILE: &str = "this-config-file-does-not-exist";

    #[test]
    fn test_staging_defaults() {
        let cfg = Config::load_from(MISSING_FILE, Environment::Staging).unwrap();
        assert_eq!(cfg.server.env_name, "staging");
        assert_eq!(cfg.server.http_port, 3000);
        assert_eq!(cfg.server.https_port, 3001);
        assert_eq!(cfg.security.hashing_secret, "thisIsASecret");
        assert_eq!(cfg.tls.key_path, "./https/key.pem");
        assert_eq!(cfg.tls.cert_path, "./https/cert.pem");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert_eq!(cfg.performance.max_connections, None);
    }

    #[test]
    fn test_production_defaults() {
        let cfg = Config::load_from(MISSING_FILE, Environment::Production).unwrap();
        assert_eq!(cfg.server.env_name, "production");
        assert_eq!(cfg.server.http_port, 5000);
        assert_eq!(cfg.server.https_port, 5001);
        assert_eq!(cfg.security.hashing_secret, "thisIsAlsoASecret");
    }

    #[test]
    fn test_socket_addrs() {
        let mut cfg = Config::load_from(MISSING_FILE, Environment::Staging).unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        assert_eq!(cfg.http_socket_addr().unwrap().port(), 3000);
        assert_eq!(cfg.https_socket_addr().unwrap().port(), 3001);

        cfg.server.host = "not a host".to_string();
        assert!(matches!(cfg.http_socket_addr(), Err(ServerError::Address(_))));
    }

    #[test]
    fn test_tls_files_missing() {
        let mut cfg = Config::load_from(MISSING_FILE, Environment::Staging).unwrap();
        cfg.tls.key_path = "missing/key.pem".to_string();
        cfg.tls.cert_path = "missing/cert.pem".to_string();
        assert!(!cfg.tls_files_present());
    }
}
