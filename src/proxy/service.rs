//! Main relay service implementation
//!
//! The `RelayService` is the main entry point for the iiko relay. It owns the
//! immutable configuration and the upstream client, and turns them into an
//! Axum router with the middleware stack applied.
//!
//! ## Service Lifecycle
//!
//! ```rust,ignore
//! use iiko_relay::proxy::{RelayConfig, RelayService};
//!
//! let service = RelayService::new(RelayConfig::default())?;
//! let router = service.into_router();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use crate::proxy::headers::{paths, PING_RESPONSE};
use crate::proxy::middleware_stack::RelayMiddlewareStack;
use crate::proxy::types::RelayConfig;
use crate::proxy::upstream::UpstreamClient;
use crate::proxy::{forwarder, token_issuer};
use axum::routing::{get, post};
use std::sync::Arc;

/// State shared by every handler
#[derive(Clone, Debug)]
pub struct RelayState {
    config: Arc<RelayConfig>,
    upstream: UpstreamClient,
}

impl RelayState {
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }
}

/// The relay: token issuer, transparent forwarder and liveness probe
pub struct RelayService {
    state: RelayState,
}

impl RelayService {
    /// Create a new relay service
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(config.request_timeout)?;

        Ok(Self {
            state: RelayState {
                config: Arc::new(config),
                upstream,
            },
        })
    }

    pub fn config(&self) -> &RelayConfig {
        self.state.config()
    }

    /// Create an Axum router for the relay with middleware
    ///
    /// Everything that is not `/auth` or `/ping` reaches the forwarder, which
    /// answers `404` outside of its `/proxy` mount point.
    pub fn into_router(self) -> axum::Router {
        let middleware_stack = RelayMiddlewareStack::new(self.state.config.max_request_size);

        let router = axum::Router::new()
            .route(paths::AUTH, post(token_issuer::issue_token))
            .route(paths::PING, get(ping_handler))
            .fallback(forwarder::forward)
            .with_state(self.state);

        middleware_stack.apply_to_router(router)
    }
}

/// Liveness probe for external uptime monitoring
async fn ping_handler() -> &'static str {
    PING_RESPONSE
}
