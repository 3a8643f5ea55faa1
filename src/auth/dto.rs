use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for `POST /users`.
///
/// Fields are optional so a missing field is reported by validation
/// alongside the others instead of failing JSON extraction.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for `POST /sessions`. Which identifier is used depends on
/// the configured login identifier.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response for a created account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    pub user_id: Uuid,
    pub access_token: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_found: bool,
    pub user_id: Uuid,
    pub access_token: String,
}
