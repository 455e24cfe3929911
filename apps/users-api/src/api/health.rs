//! Readiness check against the configured user store.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Readiness check endpoint.
///
/// Pings PostgreSQL when it backs the users domain; the in-memory store is
/// always ready.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let check: HealthCheckFuture<'_> = match &state.db {
        Some(db) => Box::pin(async move {
            database::postgres::check_health(db)
                .await
                .map_err(|e| format!("Database ping failed: {}", e))
        }),
        None => Box::pin(async { Ok(()) }),
    };

    match run_health_checks(vec![(state.store_name(), check)]).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
