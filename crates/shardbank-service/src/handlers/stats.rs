//! Dashboard report handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use shardbank_store::{report, Record, Report};

use crate::error::ApiError;
use crate::state::AppState;

/// Run a catalog report and return its normalized rows.
pub(crate) async fn report_rows(
    state: &AppState,
    which: Report,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(report::fetch(state.catalog.as_ref(), which).await?))
}

/// Per-region user, account and balance aggregates.
pub async fn regional(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::RegionalStats).await
}

/// System-wide aggregates as a single record, or `{}` when the view is empty.
pub async fn overall(State(state): State<Arc<AppState>>) -> Result<Json<Record>, ApiError> {
    report::fetch_one(state.catalog.as_ref(), Report::OverallStats)
        .await
        .map(Json)
        .map_err(|e| ApiError::from(e).with_connection_hint())
}

/// Latest transactions across every shard.
pub async fn recent_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::RecentTransactions).await
}

/// Daily transaction counts and volume.
pub async fn transactions_by_date(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::TransactionsByDate).await
}

/// Account counts and balances per region and account type.
pub async fn accounts_by_region(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    report_rows(&state, Report::AccountsByRegion).await
}
