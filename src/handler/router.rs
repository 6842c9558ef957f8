//! Route table
//!
//! Exact match on the trimmed request path. The same handler answers every
//! HTTP method; unknown paths resolve to `not_found`.

use std::collections::HashMap;

use super::handlers::{self, Handler};

/// Immutable mapping from trimmed path to handler
#[derive(Clone)]
pub struct Router {
    routes: HashMap<&'static str, Handler>,
}

impl Router {
    /// Table with the built-in `ping` and `hello` routes
    pub fn new() -> Self {
        Self::empty()
            .route("ping", handlers::ping)
            .route("hello", handlers::hello)
    }

    /// Table with no routes; every lookup resolves to `not_found`
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register `handler` for `path` (without surrounding slashes)
    #[must_use]
    pub fn route(mut self, path: &'static str, handler: Handler) -> Self {
        self.routes.insert(path, handler);
        self
    }

    /// Handler for `path`, falling back to `not_found`
    pub fn lookup(&self, path: &str) -> Handler {
        self.routes
            .get(path)
            .copied()
            .unwrap_or(handlers::not_found)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&'static str> {
        let mut paths: Vec<_> = self.routes.keys().copied().collect();
        paths.sort_unstable();
        paths
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::request::RequestData;
    use hyper::StatusCode;

    fn status_for(router: &Router, path: &str) -> StatusCode {
        router.lookup(path)(&RequestData::default()).status
    }

    #[test]
    fn test_default_routes() {
        let router = Router::new();
        assert!(router.contains("ping"));
        assert!(router.contains("hello"));
        assert_eq!(router.paths(), vec!["hello", "ping"]);
    }

    #[test]
    fn test_lookup_exact_match_only() {
        let router = Router::new();
        assert_eq!(status_for(&router, "ping"), StatusCode::OK);
        assert_eq!(status_for(&router, "hello"), StatusCode::OK);
        assert_eq!(status_for(&router, "ping/extra"), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&router, "PING"), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&router, ""), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&router, "unknown"), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_custom_route() {
        fn teapot(_: &RequestData) -> crate::handler::Reply {
            crate::handler::Reply::new(StatusCode::IM_A_TEAPOT)
        }

        let router = Router::empty().route("tea", teapot);
        assert_eq!(status_for(&router, "tea"), StatusCode::IM_A_TEAPOT);
        assert_eq!(status_for(&router, "ping"), StatusCode::NOT_FOUND);
    }
}
