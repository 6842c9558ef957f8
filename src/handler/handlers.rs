//! Route handlers
//!
//! Handlers are plain functions: they receive the parsed request and return a
//! [`Reply`]. None of them perform I/O.

use hyper::StatusCode;
use serde_json::{Map, Value};

use super::request::RequestData;

/// Message returned by `hello` over an encrypted connection
pub const HELLO_TLS_MESSAGE: &str = "Hello World!!";

/// Message returned by `hello` over plaintext
pub const HELLO_PLAINTEXT_MESSAGE: &str = "You have been hacked !!!";

/// Handler signature stored in the router table
pub type Handler = fn(&RequestData) -> Reply;

/// Status and JSON object produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub payload: Option<Map<String, Value>>,
}

impl Reply {
    /// `200 OK` with no payload
    pub const fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Serialize the payload, `{}` when none was set
    pub fn body(&self) -> String {
        match &self.payload {
            Some(map) => Value::Object(map.clone()).to_string(),
            None => "{}".to_string(),
        }
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::ok()
    }
}

/// Liveness probe
pub fn ping(_data: &RequestData) -> Reply {
    Reply::ok()
}

/// Greets the caller, warning when the connection is not encrypted
pub fn hello(data: &RequestData) -> Reply {
    let msg = if data.is_tls {
        HELLO_TLS_MESSAGE
    } else {
        HELLO_PLAINTEXT_MESSAGE
    };

    let mut payload = Map::new();
    payload.insert("msg".to_string(), Value::from(msg));
    Reply::ok().with_payload(payload)
}

pub fn not_found(_data: &RequestData) -> Reply {
    Reply::new(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(is_tls: bool) -> RequestData {
        RequestData {
            is_tls,
            payload: "anything".to_string(),
            ..RequestData::default()
        }
    }

    #[test]
    fn test_ping_always_ok_without_payload() {
        for is_tls in [false, true] {
            let reply = ping(&request(is_tls));
            assert_eq!(reply.status, StatusCode::OK);
            assert_eq!(reply.payload, None);
            assert_eq!(reply.body(), "{}");
        }
    }

    #[test]
    fn test_hello_over_tls() {
        let reply = hello(&request(true));
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body(), json!({"msg": "Hello World!!"}).to_string());
    }

    #[test]
    fn test_hello_over_plaintext() {
        let reply = hello(&request(false));
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body(), r#"{"msg":"You have been hacked !!!"}"#);
    }

    #[test]
    fn test_not_found() {
        let reply = not_found(&request(false));
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body(), "{}");
    }

    #[test]
    fn test_default_reply() {
        assert_eq!(Reply::default(), Reply::ok());
    }
}
