//! HTTP response building module
//!
//! Every response this server writes is JSON.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Header carrying the per-request identifier
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Build a JSON response from an already-serialized body
pub fn build_json_response(
    status: StatusCode,
    body: String,
    server_name: &str,
    request_id: Option<&str>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .header("Server", server_name);

    if let Some(id) = request_id {
        builder = builder.header(REQUEST_ID_HEADER, id);
    }

    builder
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(Full::new(Bytes::from_static(b"{}")));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Body sent with `413 Payload Too Large`
pub fn payload_too_large_body() -> String {
    serde_json::json!({ "error": "Payload Too Large" }).to_string()
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
