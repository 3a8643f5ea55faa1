use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{instrument, warn};

use super::dto::{ListingIdInput, SaveRequest};
use super::repo_types::SavedItem;
use super::services;
use crate::auth::extractors::AuthUser;
use crate::error::{AppError, RoutedError};
use crate::state::AppState;

fn save_failed(e: AppError) -> RoutedError {
    match e {
        AppError::Validation { .. } => e.into(),
        e => {
            warn!(error = %e, "save failed");
            e.with_status(StatusCode::NOT_FOUND)
                .message("could not save listing")
        }
    }
}

async fn save_inner(
    state: &AppState,
    user_id: uuid::Uuid,
    input: Option<ListingIdInput>,
) -> Result<(StatusCode, Json<SavedItem>), RoutedError> {
    let listing_id = services::parse_listing_id(input).map_err(save_failed)?;
    let item = services::save(state.store.as_ref(), user_id, listing_id)
        .await
        .map_err(save_failed)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /saveData `{annonsId}`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_listing(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Option<Json<SaveRequest>>,
) -> Result<(StatusCode, Json<SavedItem>), RoutedError> {
    let input = body.and_then(|Json(b)| b.annons_id);
    save_inner(&state, user.id, input).await
}

/// POST /saveData/:annonsId; the path wins over any body.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn save_listing_by_path(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(annons_id): Path<String>,
) -> Result<(StatusCode, Json<SavedItem>), RoutedError> {
    save_inner(&state, user.id, Some(ListingIdInput::Text(annons_id))).await
}

/// GET /getData: the caller's saved listings, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_saved(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<SavedItem>>, RoutedError> {
    let items = services::list(state.store.as_ref(), user.id)
        .await
        .map_err(|e| e.with_status(StatusCode::BAD_REQUEST).message("Could not get items"))?;
    Ok(Json(items))
}
