use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{CreateUserRequest, CreatedUserResponse, LoginRequest, SessionResponse},
        extractors::AuthUser,
        services,
    },
    error::{AppError, AppResult, RoutedError},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_profile))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/sessions", post(create_session))
}

/// POST /users
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Option<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), RoutedError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let user = services::create_user(state.store.as_ref(), &state.hasher, payload)
        .await
        .map_err(|e| match e {
            AppError::Validation { .. } | AppError::Duplicate { .. } => e
                .with_status(StatusCode::BAD_REQUEST)
                .message("could not create this user"),
            e => e.into(),
        })?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            user_id: user.id,
            access_token: user.access_token,
        }),
    ))
}

/// POST /sessions
#[instrument(skip(state, payload))]
pub async fn create_session(
    State(state): State<AppState>,
    payload: Option<Json<LoginRequest>>,
) -> AppResult<Json<SessionResponse>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let user = services::login(
        state.store.as_ref(),
        &state.hasher,
        state.config.login_identifier,
        payload,
    )
    .await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(SessionResponse {
        user_found: true,
        user_id: user.id,
        access_token: user.access_token,
    }))
}

/// GET /users/:id: greeting for the signed-in user. The path must name the
/// caller's own account.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_profile(
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<String>), RoutedError> {
    let not_found = || {
        AppError::NotFound("could not find user".into()).with_status(StatusCode::BAD_REQUEST)
    };
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    if id != user.id {
        return Err(not_found());
    }
    Ok((
        StatusCode::CREATED,
        Json(format!("Welcome to your page {}", user.username)),
    ))
}
