//! Request handler module
//!
//! Request parsing, the route table, the handlers themselves and the
//! dispatcher that ties them together.

pub mod dispatch;
pub mod handlers;
pub mod request;
pub mod router;

// Re-export main entry point
pub use dispatch::{handle_request, ConnectionInfo, Transport};
pub use handlers::{Handler, Reply};
pub use request::RequestData;
pub use router::Router;
