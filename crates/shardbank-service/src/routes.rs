//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::error::Elapsed;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{accounts, health, shards, stats, transactions, users};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Liveness, no database access
/// - `GET /health/ready` - Catalog reachability
///
/// ## Reports (catalog)
/// - `GET /api/stats/regional` - Per-region aggregates
/// - `GET /api/stats/overall` - System aggregates
/// - `GET /api/transactions/recent` - Latest transactions
/// - `GET /api/transactions/by-date` - Daily volume
/// - `GET /api/accounts/by-region` - Account breakdown
/// - `GET /api/users` - User directory
/// - `GET /api/users/list` - Users with account count and total balance
/// - `GET /api/accounts` - Accounts with owner
///
/// ## Lookups
/// - `GET /api/users/lookup?username=` - Find a user across shards
/// - `GET /api/shards/resolve?region=` - Resolved database address
///
/// ## Inserts (routed to shards)
/// - `POST /api/insert/user`
/// - `POST /api/insert/account`
/// - `POST /api/insert/transaction`
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Reports
        .route("/stats/regional", get(stats::regional))
        .route("/stats/overall", get(stats::overall))
        .route("/transactions/recent", get(stats::recent_transactions))
        .route("/transactions/by-date", get(stats::transactions_by_date))
        .route("/accounts/by-region", get(stats::accounts_by_region))
        // Users
        .route("/users", get(users::directory))
        .route("/users/list", get(users::list))
        .route("/users/lookup", get(users::lookup))
        // Accounts
        .route("/accounts", get(accounts::list))
        // Inserts
        .route("/insert/user", post(users::insert))
        .route("/insert/account", post(accounts::insert))
        .route("/insert/transaction", post(transactions::insert))
        // Diagnostics
        .route("/shards/resolve", get(shards::resolve))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    let router = Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state);

    with_request_timeout(router, request_timeout)
}

/// Bound every request by `timeout`; an elapsed request answers 408 `{error}`.
pub(crate) fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(middleware_error))
            .timeout(timeout),
    )
}

async fn middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// CORS for the configured origins; `*` allows any origin.
///
/// Origins that are not valid header values are logged and skipped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
