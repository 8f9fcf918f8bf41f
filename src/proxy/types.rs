//! Type definitions for the relay module

use crate::config::Settings;
use crate::domain::{ApiLogin, UpstreamBaseUrl};
use nutype::nutype;
use std::time::Duration;
use thiserror::Error;

/// Maximum size for inbound request bodies in bytes
#[nutype(
    validate(predicate = |size: &usize| *size > 0),
    derive(Clone, Copy, Debug, Display, PartialEq, AsRef)
)]
pub struct RequestSizeLimit(usize);

impl Default for RequestSizeLimit {
    fn default() -> Self {
        Self::try_new(1024 * 1024).expect("1MB is valid")
    }
}

/// Relay configuration shared by every handler
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Base URL every outbound call is joined onto
    pub base_url: UpstreamBaseUrl,
    /// Secret exchanged for access tokens; `None` makes `/auth` fail
    pub api_login: Option<ApiLogin>,
    /// Timeout for each upstream call
    pub request_timeout: Duration,
    /// Maximum inbound body size
    pub max_request_size: RequestSizeLimit,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: UpstreamBaseUrl::default(),
            api_login: None,
            request_timeout: Duration::from_secs(30),
            max_request_size: RequestSizeLimit::default(),
        }
    }
}

impl From<&Settings> for RelayConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: settings.upstream.base_url.clone(),
            api_login: settings.upstream.api_login.clone(),
            request_timeout: settings.upstream.timeout_secs.as_duration(),
            max_request_size: settings.server.max_request_bytes,
        }
    }
}

/// Errors that can occur while relaying a request
///
/// Upstream error *responses* are not represented here; those are relayed
/// to the caller as-is.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("API login is not configured on the server")]
    ApiLoginNotConfigured,

    #[error("Upstream request failed: {0}")]
    UpstreamUnreachable(String),

    #[error("Upstream request timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Failed to read upstream response body: {0}")]
    UpstreamBody(String),

    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(String),

    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("Request body exceeds {max_size} bytes")]
    RequestTooLarge { max_size: RequestSizeLimit },

    #[error("Route not found: {0}")]
    NotFound(String),
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
