//! Relay module for the iiko API
//!
//! Three leaf handlers sit behind one middleware stack:
//! - Token issuer: `POST /auth` exchanges the server-held `apiLogin`
//! - Forwarder: `/proxy/*` relays any call with the caller's bearer token
//! - Liveness probe: `GET /ping`

pub mod error_response;
pub mod forwarder;
pub mod headers;
pub mod middleware;
pub mod middleware_stack;
pub mod service;
pub mod test_utils;
pub mod token_issuer;
pub mod types;
pub mod upstream;
pub mod url_resolver;


pub use service::{RelayService, RelayState};
pub use types::{RelayConfig, RelayError, RelayResult};
