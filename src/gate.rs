//! Connectivity gate: nothing reaches a handler while the datastore is down.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Answers 503 for every request while the store is not ready. Layered
/// outside the routes, so it runs before token authentication.
pub async fn require_store_ready(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.store.is_ready().await {
        warn!(method = %request.method(), path = %request.uri().path(), "datastore not ready; rejecting request");
        return AppError::ServiceUnavailable.into_response();
    }
    next.run(request).await
}
