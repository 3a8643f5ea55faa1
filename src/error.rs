//! Error taxonomy shared by every route.
//!
//! Every failure is rendered as JSON carrying a stable `kind` so clients can
//! branch without parsing the human-readable `message`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;

/// A single rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Machine-readable error class carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Duplicate,
    Auth,
    LoginFailed,
    ServiceUnavailable,
    Upstream,
    NotFound,
    Timeout,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("{field} already exists")]
    Duplicate { field: String },

    #[error("not logged in")]
    LoggedOut,

    #[error("Login failed, please try again.")]
    LoginFailed,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("listings feed error: {message}")]
    Upstream {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("request timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::Duplicate { .. } => ErrorKind::Duplicate,
            AppError::LoggedOut => ErrorKind::Auth,
            AppError::LoginFailed => ErrorKind::LoginFailed,
            AppError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            AppError::Upstream { .. } => ErrorKind::Upstream,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Timeout => ErrorKind::Timeout,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Default status for this error when the route does not override it.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            AppError::LoggedOut => StatusCode::FORBIDDEN,
            AppError::LoginFailed => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { status, .. } => status.unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error with a route-specific status.
    ///
    /// `LoggedOut` and `ServiceUnavailable` keep their own status whatever the
    /// route asks for.
    pub fn with_status(self, status: StatusCode) -> RoutedError {
        RoutedError {
            status,
            message: None,
            error: self,
        }
    }

    fn body(&self, message: Option<&str>) -> serde_json::Value {
        let kind = self.kind();
        match self {
            AppError::LoggedOut => json!({ "kind": kind, "loggedOut": true }),
            AppError::LoginFailed => json!({
                "kind": kind,
                "userFound": false,
                "message": message.map(str::to_owned).unwrap_or_else(|| self.to_string()),
            }),
            AppError::ServiceUnavailable => json!({ "kind": kind, "error": self.to_string() }),
            AppError::Validation { errors, .. } => json!({
                "kind": kind,
                "message": message.map(str::to_owned).unwrap_or_else(|| self.to_string()),
                "errors": errors,
            }),
            AppError::Duplicate { field } => json!({
                "kind": kind,
                "message": message.map(str::to_owned).unwrap_or_else(|| self.to_string()),
                "errors": [FieldError::new(field.clone(), format!("{field} already exists"))],
            }),
            AppError::Internal(_) => json!({
                "kind": kind,
                "message": message.unwrap_or("internal server error"),
                "error": "internal server error",
            }),
            AppError::Upstream { .. } | AppError::NotFound(_) | AppError::Timeout => json!({
                "kind": kind,
                "message": message.map(str::to_owned).unwrap_or_else(|| self.to_string()),
                "error": self.to_string(),
            }),
        }
    }

    fn log(&self) {
        match self {
            AppError::Internal(e) => tracing::error!(error = %e, "internal error"),
            AppError::Upstream { message, .. } => tracing::warn!(error = %message, "listings feed failed"),
            AppError::Timeout => tracing::warn!("request timed out"),
            _ => {}
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { field } => AppError::Duplicate { field },
            StoreError::Unavailable => AppError::ServiceUnavailable,
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body(None))).into_response()
    }
}

/// An [`AppError`] bound to the status and message a particular route uses.
#[derive(Debug)]
pub struct RoutedError {
    status: StatusCode,
    message: Option<String>,
    error: AppError,
}

impl RoutedError {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl IntoResponse for RoutedError {
    fn into_response(self) -> Response {
        let RoutedError {
            status,
            message,
            error,
        } = self;
        error.log();
        let status = match error {
            AppError::LoggedOut | AppError::ServiceUnavailable => error.status(),
            _ => status,
        };
        let mut body = error.body(message.as_deref());
        // routes that override the status still expose the raw cause
        if let (Some(obj), AppError::Duplicate { .. } | AppError::Validation { .. }) =
            (body.as_object_mut(), &error)
        {
            obj.insert("error".into(), json!(error.to_string()));
        }
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for RoutedError {
    fn from(error: AppError) -> Self {
        RoutedError {
            status: error.status(),
            message: None,
            error,
        }
    }
}
