//! Liveness and readiness.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use shardbank_store::Target;

use crate::error::ApiError;
use crate::state::AppState;

const SERVICE: &str = "shardbank";

/// Liveness body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Readiness body.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// `ready` once the catalog answers.
    pub status: &'static str,
    /// Address the catalog was reached at.
    pub catalog: String,
}

/// `GET /health`. Answers without touching any database.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /health/ready`. One round trip to the catalog.
pub async fn ready(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    state.catalog.ping().await?;
    let endpoint = state.resolver.resolve(Target::Catalog);
    Ok(Json(ReadinessResponse {
        status: "ready",
        catalog: format!("{}:{}", endpoint.host, endpoint.port),
    }))
}
