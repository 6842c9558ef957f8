//! Request record handed to handlers

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use hyper::http::request::Parts;
use hyper::HeaderMap;
use serde_json::Value;

use crate::helpers;

/// Everything a handler may inspect about one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
    /// Path with all leading and trailing slashes removed
    pub trimmed_path: String,
    /// Query parameters; a repeated key keeps its last value
    pub query: HashMap<String, String>,
    /// Lowercase HTTP method
    pub method: String,
    /// Lowercase header names; repeated headers are joined with ", "
    pub headers: HashMap<String, String>,
    /// Raw request body decoded as UTF-8
    pub payload: String,
    /// Whether the connection was TLS-encrypted
    pub is_tls: bool,
}

impl RequestData {
    /// Build the record from request head and fully-read body
    pub fn from_parts(parts: &Parts, body: &[u8], is_tls: bool) -> Self {
        Self {
            trimmed_path: trim_path(parts.uri.path()).to_string(),
            query: parse_query(parts.uri.query()),
            method: parts.method.as_str().to_ascii_lowercase(),
            headers: collect_headers(&parts.headers),
            payload: String::from_utf8_lossy(body).into_owned(),
            is_tls,
        }
    }

    /// Body parsed as JSON, `{}` when it is not valid JSON
    pub fn json_payload(&self) -> Value {
        helpers::parse_json_to_object(&self.payload)
    }
}

/// Strip every leading and trailing `/`
pub fn trim_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Decode a query string into a key/value map
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match map.entry(name.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
        }
    }
    map
}
