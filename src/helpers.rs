//! Helper utilities
//!
//! Small stateless functions shared across the server:
//! - Keyed SHA-256 digests (HMAC)
//! - JSON parsing that never fails
//! - Random lowercase alphanumeric strings

use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Characters that may appear in a random string
const RANDOM_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Create an HMAC-SHA256 hex digest of `input` keyed by `secret`.
///
/// Returns `None` for an empty input.
pub fn hash(input: &str, secret: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }

    // HMAC accepts keys of any length, including empty ones
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(input.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Parse a JSON string, falling back to an empty object on any error
pub fn parse_json_to_object(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

/// Create a string of `len` random lowercase letters and digits.
///
/// Uses the thread-local generator, so the output is not suitable for secrets.
/// Returns `None` when `len` is zero.
pub fn create_random_string(len: usize) -> Option<String> {
    if len == 0 {
        return None;
    }

    let mut rng = rand::thread_rng();
    Some(
        (0..len)
            .map(|_| {
                let idx = rng.gen_range(0..RANDOM_ALPHABET.len());
                char::from(RANDOM_ALPHABET[idx])
            })
            .collect(),
    )
}
