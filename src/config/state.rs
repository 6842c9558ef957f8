// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::handler::Router;
use crate::helpers;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router,
}

impl AppState {
    /// Create state with the default route table
    pub fn new(config: Config) -> Self {
        Self::with_router(config, Router::new())
    }

    pub const fn with_router(config: Config, router: Router) -> Self {
        Self { config, router }
    }

    /// Keyed hash of `input` using the configured hashing secret
    pub fn hash(&self, input: &str) -> Option<String> {
        helpers::hash(input, &self.config.security.hashing_secret)
    }

    /// Whether access log lines should be written
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
