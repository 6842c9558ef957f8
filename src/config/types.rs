// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub tls: TlsConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
}

/// Named environment with its own port and secret defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    /// Resolve an environment name; unknown or missing names fall back to staging
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::to_ascii_lowercase).as_deref() {
            Some("production") => Self::Production,
            _ => Self::Staging,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub const fn http_port(self) -> u16 {
        match self {
            Self::Staging => 3000,
            Self::Production => 5000,
        }
    }

    pub const fn https_port(self) -> u16 {
        match self {
            Self::Staging => 3001,
            Self::Production => 5001,
        }
    }

    pub const fn hashing_secret(self) -> &'static str {
        match self {
            Self::Staging => "thisIsASecret",
            Self::Production => "thisIsAlsoASecret",
        }
    }
}

/// Listener configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub env_name: String,
    pub host: String,
    pub http_port: u16,
    pub https_port: u16,
}

/// Certificate locations for the HTTPS listener
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TlsConfig {
    pub key_path: String,
    pub cert_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Key used by `helpers::hash`
    pub hashing_secret: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Largest request body accepted, in bytes
    pub max_body_size: u64,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
    pub backlog: u32,
}
