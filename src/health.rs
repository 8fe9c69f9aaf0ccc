//! Minimal HTTP liveness service.
//!
//! Container platforms poll `/health` before routing batch jobs to an
//! instance. The service is deliberately independent of the translation
//! workflow: it answers as soon as the process is up.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Body of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    #[serde(rename = "isHealthy")]
    pub is_healthy: bool,
}

async fn root() -> &'static str {
    "Hello from the report translation service!"
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { is_healthy: true })
}

/// Build the router: `GET /` greeting and `GET /health`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

/// Serve [`router`] on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Health service listening on http://{}", addr);
    }
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await
}
