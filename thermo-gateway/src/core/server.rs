//! Server implementation
//!
//! HTTP server startup and graceful shutdown.

use crate::api;
use crate::core::{Config, ServerState};

/// HTTP server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests and embedding callers)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::new(self.config.clone()),
        };

        let app = api::build_app(&state);

        let addr = format!("{}:{}", self.config.host, self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Thermo gateway listening on {}", listener.local_addr()?);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
