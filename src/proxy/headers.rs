//! HTTP header constants and well-known paths for the relay
//!
//! This module centralizes header names, route paths and fixed response
//! bodies so handlers, middleware and tests agree on them.

use ::http::header;

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Content type assumed for upstream bodies that do not declare one
pub const APPLICATION_JSON: &str = "application/json";

/// Standard header re-exports for convenience
pub use header::{AUTHORIZATION, CONTENT_TYPE};

/// Well-known paths
pub mod paths {
    /// Token exchange endpoint
    pub const AUTH: &str = "/auth";

    /// Mount point of the transparent forwarder
    pub const PROXY: &str = "/proxy";

    /// Liveness probe for uptime monitors
    pub const PING: &str = "/ping";
}

/// Upstream iiko API paths
pub mod upstream {
    /// Exchanges an `apiLogin` for an access token
    pub const ACCESS_TOKEN: &str = "/api/1/auth/access_token";
}

/// Body returned by the liveness probe
pub const PING_RESPONSE: &str = "Pong! Server is alive.";
