//! `/proxy/*`: transparent forwarding to the iiko API
//!
//! Method, body and `Authorization` travel upstream unchanged; every other
//! inbound header stays behind. The upstream status and body come back
//! unchanged, whatever the status.

use crate::proxy::error_response::{extract_request_id, ErrorResponseExt};
use crate::proxy::headers::AUTHORIZATION;
use crate::proxy::service::RelayState;
use crate::proxy::types::*;
use crate::proxy::upstream::UpstreamResponse;
use crate::proxy::url_resolver::UrlResolver;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tracing::{error, info, warn};

/// Axum handler for forwarded requests
pub async fn forward(State(state): State<RelayState>, request: Request) -> Response {
    let request_id = extract_request_id(request.headers());

    match relay(&state, request).await {
        Ok(upstream) => upstream.into_response(),
        Err(e @ (RelayError::NotFound(_) | RelayError::RequestTooLarge { .. })) => {
            warn!(error = %e, "Rejected request");
            e.into_error_response(request_id)
        }
        Err(e) => {
            error!(error = %e, "Forwarding failed");
            e.into_error_response(request_id)
        }
    }
}

async fn relay(state: &RelayState, request: Request) -> RelayResult<UpstreamResponse> {
    let (parts, body) = request.into_parts();

    let target = UrlResolver::resolve_target_url(&state.config().base_url, &parts.uri)?;
    let authorization = parts.headers.get(AUTHORIZATION).cloned();

    // Chunked bodies carry no Content-Length for the limit layer to reject up front
    let max_size = state.config().max_request_size;
    let body = Limited::new(body, *max_size.as_ref())
        .collect()
        .await
        .map_err(|e| {
            if exceeds_limit(&*e) {
                RelayError::RequestTooLarge { max_size }
            } else {
                RelayError::RequestBody(e.to_string())
            }
        })?
        .to_bytes();

    info!(method = %parts.method, upstream_path = %target.path(), "Forwarding request upstream");

    let response = state
        .upstream()
        .forward(parts.method, target, authorization, body)
        .await?;

    if !response.status.is_success() {
        warn!(
            status = response.status.as_u16(),
            "Upstream returned an error response"
        );
    }

    Ok(response)
}

/// The limit may trip in this handler or in the body limit layer beneath it
fn exceeds_limit(error: &(dyn std::error::Error + 'static)) -> bool {
    std::iter::successors(Some(error), |e| e.source()).any(|e| e.is::<LengthLimitError>())
}
