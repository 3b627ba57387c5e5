//! Shard resolution diagnostics.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use shardbank_store::Endpoint;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for shard resolution.
#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    /// Region code; omitted or blank means the catalog.
    pub region: Option<String>,
}

/// Show which address a region (or the catalog) resolves to.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ResolveParams>, QueryRejection>,
) -> Result<Json<Endpoint>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.resolver.resolve_code(params.region.as_deref())?))
}
