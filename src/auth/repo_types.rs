use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub username: String,           // display name, 2..=30 chars
    pub email: String,              // lower-cased login email
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 PHC string, not exposed in JSON
    #[serde(skip_serializing)]
    pub access_token: String,       // bearer credential, never rotated
    pub created_at: OffsetDateTime, // creation timestamp
}
