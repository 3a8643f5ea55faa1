use axum::{extract::State, Json};
use serde_json::Value;
use tracing::instrument;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /list: the whole listings feed, passed through untouched.
#[instrument(skip(state))]
pub async fn list_listings(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let items = state.listings.fetch_all().await?;
    Ok(Json(items))
}
