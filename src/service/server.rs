//! Summarization server implementation

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::api::create_router;
use super::SummarizationService;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Summarize → speak → upload chain
    pub service: SummarizationService,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: SummarizationService) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Summary Server
// ============================================================================

/// HTTP server for the summarization service
pub struct SummaryServer {
    bind_address: SocketAddr,
    enable_cors: bool,
    enable_request_logging: bool,
    state: AppState,
}

impl SummaryServer {
    /// Create a new server
    pub fn new(config: &ServerConfig, service: SummarizationService) -> Result<Self, ServerError> {
        let bind_address = config
            .bind_address
            .parse()
            .map_err(|e| ServerError::ConfigError(format!("{}: {e}", config.bind_address)))?;

        Ok(Self {
            bind_address,
            enable_cors: config.enable_cors,
            enable_request_logging: config.enable_request_logging,
            state: AppState::new(service),
        })
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.bind_address;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        tracing::info!(%addr, "Summarization server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!(
            uptime_secs = self.state.start_time.elapsed().as_secs(),
            "Summarization server shutdown complete"
        );
        Ok(())
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to bind to address
    #[error("Failed to bind: {0}")]
    BindError(String),

    /// Server error
    #[error("Server error: {0}")]
    ServeError(String),
}
