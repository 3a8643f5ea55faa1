use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::repo_types::User;
use super::services::resolve_token;
use crate::error::AppError;
use crate::state::AppState;

/// The account behind the request's access token.
///
/// Rejects with [`AppError::LoggedOut`] (403 `{loggedOut: true}`) when the
/// header is missing or the token is unknown.
pub struct AuthUser(pub User);

/// Pulls the token out of an `Authorization` value. Both the bare token and
/// `Bearer <token>` are accepted.
pub(crate) fn token_from_header(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(token_from_header)
            .unwrap_or_default();

        match resolve_token(state.store.as_ref(), token).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(AppError::LoggedOut) => {
                warn!(path = %parts.uri.path(), "rejected unknown access token");
                Err(AppError::LoggedOut)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_bearer_tokens() {
        assert_eq!(token_from_header("abc123"), "abc123");
        assert_eq!(token_from_header("Bearer abc123"), "abc123");
        assert_eq!(token_from_header("bearer  abc123 "), "abc123");
        assert_eq!(token_from_header(""), "");
    }
}
