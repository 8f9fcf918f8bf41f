//! Unified error response handling for the relay
//!
//! Every failure the relay itself produces is rendered the same way:
//! a JSON body with a stable `code`, a human-readable `message` and the
//! request ID used for correlation. Upstream error responses never pass
//! through here; they are relayed verbatim.

use crate::proxy::headers::X_REQUEST_ID;
use crate::proxy::types::RelayError;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Unique error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Request ID for correlation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    /// Add request ID for correlation
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Convert to HTTP response with proper headers
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        let request_id = self.request_id.clone();
        let mut response = (status, Json(self)).into_response();

        if let Some(id) = request_id {
            if let Ok(header_value) = HeaderValue::from_str(&id) {
                response.headers_mut().insert(X_REQUEST_ID, header_value);
            }
        }

        response
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to standardized error response
    fn to_error_response(&self) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self) -> StatusCode;

    /// Render as an HTTP response correlated with `request_id`
    fn into_error_response(self, request_id: Option<String>) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let mut error = self.to_error_response();
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }
        error.into_response_with_status(status)
    }
}

impl ErrorResponseExt for RelayError {
    fn to_error_response(&self) -> ErrorResponse {
        use RelayError::*;

        let code = match self {
            ApiLoginNotConfigured => "API_LOGIN_NOT_CONFIGURED",
            UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            UpstreamBody(_) => "UPSTREAM_BODY_ERROR",
            InvalidTargetUrl(_) => "INVALID_TARGET_URL",
            RequestBody(_) => "INVALID_REQUEST_BODY",
            RequestTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            NotFound(_) => "NOT_FOUND",
        };

        ErrorResponse::new(code, self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        use RelayError::*;

        match self {
            ApiLoginNotConfigured | InvalidTargetUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UpstreamUnreachable(_) | UpstreamBody(_) => StatusCode::BAD_GATEWAY,
            UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RequestBody(_) => StatusCode::BAD_REQUEST,
            RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Helper to extract request ID from headers
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
