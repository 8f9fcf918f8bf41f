//! Middleware stack builder for clean composition
//!
//! This module provides a builder for composing the Tower middleware stack,
//! making it easier to maintain and test the middleware pipeline.

use crate::proxy::middleware::*;
use crate::proxy::types::RequestSizeLimit;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

/// Builder for composing the relay middleware stack
pub struct RelayMiddlewareStack {
    max_request_size: RequestSizeLimit,
}

impl RelayMiddlewareStack {
    /// Create a new middleware stack builder
    pub fn new(max_request_size: RequestSizeLimit) -> Self {
        Self { max_request_size }
    }

    /// Apply the complete middleware stack to a router
    ///
    /// The middleware are applied in the following order (outer to inner):
    /// 1. Request ID generation/propagation
    /// 2. Logging (with request ID)
    /// 3. CORS, answering preflights before routing
    /// 4. Declared `Content-Length` check, answering 413 as structured JSON
    /// 5. Request body limit for streamed bodies
    pub fn apply_to_router<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(RequestBodyLimitLayer::new(*self.max_request_size.as_ref()))
            .layer(from_fn_with_state(
                self.max_request_size,
                declared_size_middleware,
            ))
            .layer(cors_layer())
            .layer(from_fn(logging_middleware))
            .layer(from_fn(request_id_middleware))
    }
}

impl Default for RelayMiddlewareStack {
    fn default() -> Self {
        Self::new(RequestSizeLimit::default())
    }
}

/// The relay fronts a public website, so every origin is accepted
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::headers::X_REQUEST_ID;
    use axum::{
        body::Body,
        http::{header, Method, StatusCode},
        routing::{get, post},
    };
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .route("/upload", post(|body: String| async move { body.len().to_string() }))
    }

    #[tokio::test]
    async fn test_middleware_stack_builder() {
        let app = RelayMiddlewareStack::default().apply_to_router(router());

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/test")
                    .header(header::ORIGIN, "https://restaurant.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight_is_answered() {
        let app = RelayMiddlewareStack::default().apply_to_router(router());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/test")
                    .header(header::ORIGIN, "https://restaurant.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn test_body_limit_rejects_large_requests() {
        let limit = RequestSizeLimit::try_new(16).unwrap();
        let app = RelayMiddlewareStack::new(limit).apply_to_router(router());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method(Method::POST)
                    .uri("/upload")
                    .header(header::CONTENT_LENGTH, "64")
                    .body(Body::from("x".repeat(64)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], "PAYLOAD_TOO_LARGE");
        assert!(!error["request_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_body_within_declared_limit_passes() {
        let limit = RequestSizeLimit::try_new(16).unwrap();
        let app = RelayMiddlewareStack::new(limit).apply_to_router(router());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method(Method::POST)
                    .uri("/upload")
                    .header(header::CONTENT_LENGTH, "8")
                    .body(Body::from("x".repeat(8)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
