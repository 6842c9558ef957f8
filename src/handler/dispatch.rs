//! Unified request dispatcher
//!
//! Shared by the plaintext and TLS listeners: parses the request, reads the
//! body, routes to a handler and writes the reply as JSON.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::http::request::Parts;
use hyper::{Request, Response, StatusCode};

use super::request::RequestData;
use crate::config::AppState;
use crate::helpers;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Length of the identifier attached to every response
const REQUEST_ID_LEN: usize = 20;

/// How the connection reached us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    pub const fn is_encrypted(self) -> bool {
        matches!(self, Self::Tls)
    }

    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Plain => "http",
            Self::Tls => "https",
        }
    }
}

/// Per-connection facts passed to every request on that connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionInfo {
    pub peer_addr: SocketAddr,
    pub transport: Transport,
}

enum BodyRead {
    Complete(Bytes),
    TooLarge,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    conn: ConnectionInfo,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let request_id = helpers::create_random_string(REQUEST_ID_LEN);

    let (status, payload) = match read_body(&parts, body, state.config.http.max_body_size).await {
        BodyRead::Complete(bytes) => {
            let data = RequestData::from_parts(&parts, &bytes, conn.transport.is_encrypted());
            let handler = state.router.lookup(&data.trimmed_path);
            let reply = handler(&data);
            (reply.status, reply.body())
        }
        BodyRead::TooLarge => (StatusCode::PAYLOAD_TOO_LARGE, http::payload_too_large_body()),
    };

    logger::log_response(status.as_u16(), &payload);

    if state.access_log() {
        let entry = access_entry(&parts, conn, status, payload.len(), started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(http::build_json_response(
        status,
        payload,
        &state.config.http.server_name,
        request_id.as_deref(),
    ))
}

/// Read the whole body, refusing anything larger than `limit` bytes
async fn read_body<B>(parts: &Parts, body: B, limit: u64) -> BodyRead
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(declared) = declared_length(parts) {
        if declared > limit {
            logger::log_warning(&format!(
                "Request body too large: {declared} bytes (max: {limit})"
            ));
            return BodyRead::TooLarge;
        }
    }

    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => BodyRead::Complete(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeded {limit} bytes while reading"));
            BodyRead::TooLarge
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            BodyRead::Complete(Bytes::new())
        }
    }
}

/// Content-Length header, when present and numeric
fn declared_length(parts: &Parts) -> Option<u64> {
    parts
        .headers
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn access_entry(
    parts: &Parts,
    conn: ConnectionInfo,
    status: StatusCode,
    body_bytes: usize,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: hyper::header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        conn.peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.scheme = conn.transport.scheme();
    entry.status = status.as_u16();
    entry.body_bytes = body_bytes;
    entry.referer = header(hyper::header::REFERER);
    entry.user_agent = header(hyper::header::USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use serde_json::json;

    fn state_with_limit(max_body_size: u64) -> Arc<AppState> {
        let mut cfg = Config::load_from("no-such-config", Environment::Staging).unwrap();
        cfg.logging.access_log = false;
        cfg.http.max_body_size = max_body_size;
        Arc::new(AppState::new(cfg))
    }

    fn conn(transport: Transport) -> ConnectionInfo {
        ConnectionInfo {
            peer_addr: "127.0.0.1:40000".parse().unwrap(),
            transport,
        }
    }

    async fn send(
        method: &str,
        uri: &str,
        body: &'static str,
        transport: Transport,
    ) -> (StatusCode, hyper::HeaderMap, String) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        let resp = handle_request(req, state_with_limit(1024), conn(transport))
            .await
            .unwrap();
        let (head, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (head.status, head.headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_ping_returns_empty_object() {
        let (status, headers, body) = send("GET", "/ping", "", Transport::Plain).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");
        assert_eq!(headers["content-type"], "application/json");
        let id = headers["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), REQUEST_ID_LEN);
    }

    #[tokio::test]
    async fn test_ping_ignores_method_and_body() {
        for method in ["POST", "PUT", "DELETE", "PATCH"] {
            let (status, _, body) = send(method, "/ping", "{not json", Transport::Plain).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "{}");
        }
    }

    #[tokio::test]
    async fn test_hello_depends_on_transport() {
        let (status, _, body) = send("GET", "/hello", "", Transport::Plain).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"msg":"You have been hacked !!!"}"#);

        let (status, _, body) = send("GET", "/hello", "", Transport::Tls).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"msg": "Hello World!!"}).to_string());
    }

    #[tokio::test]
    async fn test_path_is_trimmed_before_routing() {
        let (status, _, body) = send("GET", "///hello//?x=1", "", Transport::Plain).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"msg":"You have been hacked !!!"}"#);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        for (method, uri) in [("GET", "/unknown"), ("POST", "/"), ("DELETE", "/ping/extra")] {
            let (status, _, body) = send(method, uri, r#"{"a":1}"#, Transport::Plain).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, "{}");
        }
    }

    #[tokio::test]
    async fn test_declared_length_over_limit() {
        let req = Request::builder()
            .method("POST")
            .uri("/ping")
            .header("content-length", "4096")
            .body(Full::new(Bytes::from_static(b"small")))
            .unwrap();
        let resp = handle_request(req, state_with_limit(1024), conn(Transport::Plain))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"error":"Payload Too Large"}"#);
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit() {
        let req = Request::builder()
            .method("POST")
            .uri("/ping")
            .body(Full::new(Bytes::from(vec![b'a'; 64])))
            .unwrap();
        let resp = handle_request(req, state_with_limit(16), conn(Transport::Plain))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_at_limit_is_accepted() {
        let req = Request::builder()
            .method("POST")
            .uri("/ping")
            .body(Full::new(Bytes::from(vec![b'a'; 16])))
            .unwrap();
        let resp = handle_request(req, state_with_limit(16), conn(Transport::Plain))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_transport() {
        assert!(Transport::Tls.is_encrypted());
        assert!(!Transport::Plain.is_encrypted());
        assert_eq!(Transport::Tls.scheme(), "https");
        assert_eq!(Transport::Plain.scheme(), "http");
    }
}
