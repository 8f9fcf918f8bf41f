use crate::config::Settings;
use crate::proxy::{RelayConfig, RelayService};
use crate::Result;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Load settings from the environment and bind the configured address
    pub async fn new() -> Result<Self> {
        Self::build(Settings::new()?).await
    }

    /// Bind the address named by `settings`
    #[instrument(skip_all)]
    pub async fn build(settings: Settings) -> Result<Self> {
        let listener = TcpListener::bind(settings.bind_address()).await?;
        Self::with_listener(settings, listener)
    }

    /// Serve on an already bound listener
    pub fn with_listener(settings: Settings, listener: TcpListener) -> Result<Self> {
        let service = RelayService::new(RelayConfig::from(&settings))?;

        if service.config().api_login.is_none() {
            warn!("IIKO_API_LOGIN is not set; /auth will answer with a configuration error");
        }

        info!(
            address = %listener.local_addr()?,
            upstream = %service.config().base_url,
            "Relay configured"
        );

        Ok(Self {
            settings,
            listener,
            router: service.into_router(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until SIGINT or SIGTERM
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    #[instrument(skip_all)]
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(address = %self.listener.local_addr()?, "Starting iiko relay server");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Resolves when the process receives a shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_settings() -> Settings {
        let dir = tempfile::tempdir().unwrap();
        let vars = HashMap::from([(
            "IIKO_RELAY__SERVER__HOST".to_string(),
            "127.0.0.1".to_string(),
        )]);
        Settings::load(dir.path(), vars).unwrap()
    }

    #[tokio::test]
    async fn test_application_serves_and_shuts_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let app = Application::with_listener(test_settings(), listener).unwrap();
        let addr = app.local_addr().unwrap();
        assert!(app.settings().upstream.api_login.is_none());

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(app.run_until(async {
            let _ = stop_rx.await;
        }));

        let body = reqwest::get(format!("http://{addr}/ping"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, crate::proxy::headers::PING_RESPONSE);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
