//! Outbound client for the iiko API
//!
//! Wraps a pooled `reqwest::Client` and turns transport failures into
//! [`RelayError`]s. Whatever status the upstream answers with is returned as
//! an [`UpstreamResponse`] so callers can relay it untouched.

use crate::domain::{ApiLogin, UpstreamBaseUrl};
use crate::proxy::headers::{APPLICATION_JSON, CONTENT_TYPE};
use crate::proxy::types::*;
use crate::proxy::url_resolver::UrlResolver;
use axum::{
    body::Body,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::{header::AUTHORIZATION, Client, Url};
use serde::Serialize;
use std::time::Duration;

/// Body of the upstream token exchange
#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    #[serde(rename = "apiLogin")]
    api_login: &'a str,
}

/// A fully read upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let content_type = self
            .content_type
            .unwrap_or_else(|| HeaderValue::from_static(APPLICATION_JSON));

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        response
    }
}

/// HTTP client for the upstream API
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http_client: Client,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    /// Exchange the `apiLogin` for an access token
    pub async fn request_access_token(
        &self,
        base_url: &UpstreamBaseUrl,
        api_login: &ApiLogin,
    ) -> RelayResult<UpstreamResponse> {
        let url = UrlResolver::access_token_url(base_url)?;
        let request = self.http_client.post(url).json(&AccessTokenRequest {
            api_login: api_login.as_ref(),
        });

        self.execute(request).await
    }

    /// Send `method` to `url`, carrying only the caller's `Authorization`
    ///
    /// An empty `body` sends no body at all; a non-empty one is declared JSON.
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        authorization: Option<HeaderValue>,
        body: Bytes,
    ) -> RelayResult<UpstreamResponse> {
        let mut request = self.http_client.request(method, url);

        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        if !body.is_empty() {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
                .body(body);
        }

        self.execute(request).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> RelayResult<UpstreamResponse> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::UpstreamTimeout(self.timeout)
            } else {
                RelayError::UpstreamBody(e.without_url().to_string())
            }
        })?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    /// The target URL is dropped from the message; its query may carry identifiers
    fn transport_error(&self, error: reqwest::Error) -> RelayError {
        if error.is_timeout() {
            RelayError::UpstreamTimeout(self.timeout)
        } else {
            RelayError::UpstreamUnreachable(error.without_url().to_string())
        }
    }
}
