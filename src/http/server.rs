//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a wildcard proxy handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener and drain on shutdown
//! - Capture each request and hand it to the forwarding engine
//! - Record per-request metrics

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::forwarding::ForwardingEngine;
use crate::http::middleware::cors_middleware;
use crate::http::request::{mark_caller_request_id, ProxyRequestId, RequestSnapshot};
use crate::http::response::{ProxyError, RelayedResponse};
use crate::lifecycle::StartupError;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ForwardingEngine>,
    pub max_body_bytes: usize,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let engine = ForwardingEngine::from_config(&config)?;
        Ok(Self::with_engine(config, engine))
    }

    /// Create a server around a prepared engine.
    pub fn with_engine(config: ProxyConfig, engine: ForwardingEngine) -> Self {
        let state = AppState {
            engine: Arc::new(engine),
            max_body_bytes: config.limits.body_limit(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let cors = Arc::new(config.cors.clone());

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(ProxyRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
            .layer(middleware::from_fn(mark_caller_request_id))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Checks the upstream, captures the request, and forwards it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let response = match forward_request(&state, request).await {
        Ok(relayed) => relayed.into_response(),
        Err(e) => {
            if !matches!(e, ProxyError::Rejected { .. }) {
                tracing::warn!(method = %method, error = %e, "Proxy error");
            }
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn forward_request(state: &AppState, request: Request<Body>) -> Result<RelayedResponse, ProxyError> {
    // Configuration is checked before any body is read.
    state.engine.target()?;

    let snapshot = RequestSnapshot::capture(request, state.max_body_bytes).await?;
    state.engine.forward(&snapshot).await
}
