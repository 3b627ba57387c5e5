//! Account handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use shardbank_core::NewAccountRequest;
use shardbank_store::{CreatedAccount, Record, Report};

use super::stats::report_rows;
use super::SuccessResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Every account with its owner, ordered by account id.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::AccountListing).await
}

/// Open an account on its owner's shard.
pub async fn insert(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewAccountRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<CreatedAccount>>, ApiError> {
    let Json(request) = payload?;
    let account = request.validate()?;
    let created = state.provisioner.create_account(&account).await?;
    Ok(Json(SuccessResponse::new(
        "Account inserted successfully",
        created,
    )))
}
