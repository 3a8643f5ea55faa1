use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{CreateUserRequest, LoginRequest};
use super::password::PasswordHasher;
use super::repo_types::User;
use super::token::generate_access_token;
use crate::config::LoginIdentifier;
use crate::db::{Datastore, NewUserRecord, StoreResult};
use crate::error::{AppError, AppResult, FieldError};

pub const USERNAME_MIN_CHARS: usize = 2;
pub const USERNAME_MAX_CHARS: usize = 30;
pub const PASSWORD_MIN_CHARS: usize = 5;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign-up input that passed validation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Checks every field and reports all violations at once.
pub fn validate_new_user(req: CreateUserRequest) -> Result<NewUser, AppError> {
    let mut errors = Vec::new();

    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email address is required"));
    } else if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Email address is invalid"));
    }

    let username = req.username.as_deref().map(str::trim).unwrap_or_default().to_string();
    let len = username.chars().count();
    if username.is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    } else if len < USERNAME_MIN_CHARS {
        errors.push(FieldError::new(
            "username",
            format!("Username is too short - minimum {USERNAME_MIN_CHARS} characters"),
        ));
    } else if len > USERNAME_MAX_CHARS {
        errors.push(FieldError::new(
            "username",
            format!("Username is too long - maximum {USERNAME_MAX_CHARS} characters"),
        ));
    }

    let password = req.password.unwrap_or_default();
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN_CHARS} characters"),
        ));
    }

    if !errors.is_empty() {
        return Err(AppError::validation("invalid user data", errors));
    }
    Ok(NewUser {
        username,
        email,
        password,
    })
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_off_runtime(hasher: &PasswordHasher, password: String) -> anyhow::Result<String> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("password hashing task")?
}

/// Creates an account: validate, hash, mint the access token, persist.
pub async fn create_user(
    store: &dyn Datastore,
    hasher: &PasswordHasher,
    req: CreateUserRequest,
) -> AppResult<User> {
    let new_user = validate_new_user(req)?;
    let password_hash = hash_off_runtime(hasher, new_user.password).await?;

    let record = NewUserRecord {
        id: Uuid::new_v4(),
        username: new_user.username,
        email: new_user.email,
        password_hash,
        access_token: generate_access_token(),
    };
    let user = store.insert_user(record).await?;
    debug!(user_id = %user.id, "user persisted");
    Ok(user)
}

/// Looks an account up by the configured login field.
pub async fn find_by_login(
    store: &dyn Datastore,
    identifier: LoginIdentifier,
    key: &str,
) -> StoreResult<Option<User>> {
    match identifier {
        LoginIdentifier::Email => store.find_user_by_email(&normalize_email(key)).await,
        LoginIdentifier::Username => store.find_user_by_username(key.trim()).await,
    }
}

/// Checks credentials and hands back the account's existing token holder.
///
/// Unknown account, wrong password and missing fields all end in the same
/// [`AppError::LoginFailed`].
pub async fn login(
    store: &dyn Datastore,
    hasher: &PasswordHasher,
    identifier: LoginIdentifier,
    req: LoginRequest,
) -> AppResult<User> {
    let key = match identifier {
        LoginIdentifier::Email => req.email,
        LoginIdentifier::Username => req.username,
    }
    .unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = if key.trim().is_empty() {
        None
    } else {
        find_by_login(store, identifier, &key).await?
    };

    let hasher = hasher.clone();
    let verified = tokio::task::spawn_blocking(move || match user {
        Some(user) => match hasher.verify(&password, &user.password_hash) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        },
        None => {
            hasher.verify_dummy(&password);
            Ok(None)
        }
    })
    .await
    .context("password verification task")??;

    match verified {
        Some(user) => Ok(user),
        None => {
            warn!(?identifier, "login failed");
            Err(AppError::LoginFailed)
        }
    }
}

/// Resolves a bearer token to its account.
pub async fn resolve_token(store: &dyn Datastore, token: &str) -> AppResult<User> {
    if token.is_empty() {
        return Err(AppError::LoggedOut);
    }
    store
        .find_user_by_token(token)
        .await?
        .ok_or(AppError::LoggedOut)
}
