//! Money movement handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use shardbank_core::MoneyRequest;
use shardbank_store::DispatchOutcome;

use super::SuccessResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Deposit, withdraw, transfer or record a transaction.
///
/// Validation failures are 400; procedure and connection failures are 500.
pub async fn insert(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MoneyRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<DispatchOutcome>>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.dispatcher.dispatch(request).await?;
    Ok(Json(SuccessResponse::new(outcome.message.clone(), outcome)))
}
