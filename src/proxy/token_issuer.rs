//! `POST /auth`: exchanges the server-held `apiLogin` for an access token

use crate::proxy::error_response::{extract_request_id, ErrorResponseExt};
use crate::proxy::service::RelayState;
use crate::proxy::types::*;
use crate::proxy::upstream::UpstreamResponse;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

/// Axum handler for the token exchange
///
/// The inbound body is ignored; the caller never supplies the login.
pub async fn issue_token(State(state): State<RelayState>, headers: HeaderMap) -> Response {
    match exchange(&state).await {
        Ok(upstream) => upstream.into_response(),
        Err(e) => {
            error!(error = %e, "Token exchange failed");
            e.into_error_response(extract_request_id(&headers))
        }
    }
}

async fn exchange(state: &RelayState) -> RelayResult<UpstreamResponse> {
    let config = state.config();
    let api_login = config
        .api_login
        .as_ref()
        .ok_or(RelayError::ApiLoginNotConfigured)?;

    let response = state
        .upstream()
        .request_access_token(&config.base_url, api_login)
        .await?;

    if response.status.is_success() {
        info!(status = response.status.as_u16(), "Access token issued");
    } else {
        warn!(
            status = response.status.as_u16(),
            "Upstream rejected token exchange"
        );
    }

    Ok(response)
}
