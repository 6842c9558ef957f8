//! HTTP protocol layer module
//!
//! Response construction, decoupled from routing and handlers.

pub mod response;

// Re-export commonly used items
pub use response::{
    build_json_response, payload_too_large_body, CONTENT_TYPE_JSON, REQUEST_ID_HEADER,
};
