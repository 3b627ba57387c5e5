//! User handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use shardbank_core::{NewUserRequest, UserLocation};
use shardbank_store::{Record, Report};

use super::stats::report_rows;
use super::SuccessResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// `(user_id, username, full_name)` for every user, ordered by username.
pub async fn directory(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::UserDirectory).await
}

/// Every user with account count and total balance, ordered by user id.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::UserSummaries).await
}

/// Query parameters for username lookup.
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    /// Username to find.
    pub username: Option<String>,
}

/// Find a user by username, probing each shard in region order.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<UserLocation>, ApiError> {
    let Query(params) = params?;
    let username = params
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("username is required".into()))?;

    state
        .locator
        .locate_username(&username)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user {username} not found")))
}

/// Create a user on its region's shard.
pub async fn insert(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewUserRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<UserLocation>>, ApiError> {
    let Json(request) = payload?;
    let user = request.validate()?;
    let location = state.provisioner.create_user(&user).await?;
    Ok(Json(SuccessResponse::new(
        "User inserted successfully",
        location,
    )))
}
