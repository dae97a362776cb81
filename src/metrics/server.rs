//! HTTP exporter for session metrics.
//!
//! Serves `/metrics` in Prometheus text format and `/health`, which
//! answers with the last published session state.

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Exporter failures. None of them affect the capture session.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or runtime setup failed.
    #[error("metrics exporter I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The server loop ended with an error.
    #[error("metrics exporter stopped: {0}")]
    Serve(String),
}

/// Where the exporter listens.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
}

impl MetricsServerConfig {
    /// Loopback only; the exporter is meant for a local scraper.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], port)),
        }
    }
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

/// Registry plus the most recent snapshot.
pub struct MetricsState {
    registry: MetricsRegistry,
    last: MetricsSnapshot,
}

impl MetricsState {
    /// Publishes a snapshot from the driver loop.
    pub fn update(&mut self, snapshot: &MetricsSnapshot) {
        self.registry.update(snapshot);
        self.last = snapshot.clone();
    }

    /// The last published snapshot.
    pub fn last(&self) -> &MetricsSnapshot {
        &self.last
    }
}

/// Handle the driver loop publishes through.
pub type SharedMetrics = Arc<RwLock<MetricsState>>;

/// Prometheus exporter bound to one session.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: SharedMetrics,
}

impl MetricsServer {
    /// An exporter for `registry`, not yet listening.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        let state = MetricsState {
            registry,
            last: MetricsSnapshot::default(),
        };
        Self {
            config,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Handle for publishing snapshots.
    pub fn state(&self) -> SharedMetrics {
        self.state.clone()
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(serve_metrics))
            .route("/health", get(serve_health))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Serves until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Metrics exporter listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))
    }

    /// Runs the exporter on its own runtime thread.
    ///
    /// The driver loop stays synchronous and publishes with
    /// `blocking_write` on the returned handle.
    pub fn spawn(self) -> Result<SharedMetrics, ServerError> {
        let state = self.state();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        std::thread::Builder::new()
            .name("metrics".into())
            .spawn(move || {
                if let Err(e) = runtime.block_on(self.run()) {
                    tracing::error!(error = %e, "Metrics exporter exited");
                }
            })?;

        Ok(state)
    }
}

async fn serve_metrics(State(state): State<SharedMetrics>) -> Response {
    let encoded = state.read().await.registry.encode();
    match encoded {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn serve_health(State(state): State<SharedMetrics>) -> Response {
    let running = state.read().await.last().running;
    let body = if running { "running" } else { "idle" };
    (StatusCode::OK, body).into_response()
}
