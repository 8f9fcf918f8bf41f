//! Middleware implementations for the relay

use crate::proxy::error_response::{extract_request_id, ErrorResponseExt};
use crate::proxy::headers::X_REQUEST_ID;
use crate::proxy::types::{RelayError, RequestSizeLimit};
use axum::{
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Request ID middleware - ensures every request has a unique ID for tracing
///
/// A caller-supplied ID is kept only when it parses as a UUID; otherwise a
/// fresh v7 UUID replaces it.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|existing| existing.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::now_v7);

    // Hyphenated UUIDs are plain ASCII
    let header_value = HeaderValue::from_str(&request_id.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id"));

    request
        .headers_mut()
        .insert(X_REQUEST_ID, header_value.clone());

    let mut response = next.run(request).await;

    response.headers_mut().insert(X_REQUEST_ID, header_value);

    response
}

/// Logging middleware - logs request/response details with timing
///
/// Only the path is logged; query strings and headers may carry identifiers.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Body size middleware - refuses a declared `Content-Length` over the limit
///
/// Bodies without a usable `Content-Length` are bounded while they are read.
pub async fn declared_size_middleware(
    State(max_size): State<RequestSizeLimit>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    match declared {
        Some(length) if length > *max_size.as_ref() as u64 => {
            warn!(content_length = length, limit = %max_size, "Rejected oversized request");
            RelayError::RequestTooLarge { max_size }
                .into_error_response(extract_request_id(request.headers()))
        }
        _ => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/echo-id",
                get(|request: Request| async move {
                    request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .layer(from_fn(logging_middleware))
            .layer(from_fn(request_id_middleware))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = app()
            .oneshot(http::Request::builder().uri("/echo-id").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let header = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
        let uuid = Uuid::parse_str(&header).unwrap();
        assert_eq!(uuid.get_version_num(), 7);
        assert_eq!(body_string(response).await, header);
    }

    #[tokio::test]
    async fn test_preserves_valid_request_id() {
        let existing = Uuid::now_v7().to_string();
        let response = app()
            .oneshot(
                http::Request::builder()
                    .uri("/echo-id")
                    .header(X_REQUEST_ID, &existing)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], existing.as_str());
    }

    #[tokio::test]
    async fn test_replaces_malformed_request_id() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .uri("/echo-id")
                    .header(X_REQUEST_ID, "not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let header = response.headers()[X_REQUEST_ID].to_str().unwrap();
        assert_ne!(header, "not-a-uuid");
        assert!(Uuid::parse_str(header).is_ok());
    }
}
