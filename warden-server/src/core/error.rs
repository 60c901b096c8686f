//! Error types for the Warden server
//!
//! Domain services raise typed errors; the HTTP boundary maps each kind to a
//! status code and a redacted client-facing body. Full detail is logged
//! server-side only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;

/// Result alias used across the crate
pub type WardenResult<T> = Result<T, WardenError>;

/// Main error type for the Warden server
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("password and password confirmation do not match")]
    PasswordMismatch,

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    /// Uniform credential failure. The message never reveals whether the
    /// username existed or the password was wrong.
    #[error("invalid username or password")]
    LoginFailed,

    /// Uniform token failure. Malformed, bad-signature and expired tokens
    /// all collapse into this one kind.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("access denied for path: {0}")]
    AccessDenied(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("username already taken")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("role {0} is already assigned")]
    DuplicateAssignment(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("default role {0} is not provisioned")]
    MissingDefaultRole(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// Build a validation error with a single offending field
    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        Self::Validation {
            message,
            field_errors,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PasswordMismatch | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::LoginFailed | Self::InvalidToken | Self::AuthenticationRequired => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateUsername
            | Self::DuplicateEmail
            | Self::DuplicateAssignment(_)
            | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MissingDefaultRole(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code carried in the response body
    pub fn code(&self) -> &'static str {
        match self {
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateAssignment(_) => "DUPLICATE_ASSIGNMENT",
            Self::Conflict(_) => "CONFLICT",
            Self::MissingDefaultRole(_) => "MISSING_DEFAULT_ROLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message. Internal detail is redacted here and logged by
    /// the caller instead.
    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn field_errors(&self) -> HashMap<String, String> {
        match self {
            Self::Validation { field_errors, .. } => field_errors.clone(),
            _ => HashMap::new(),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, String>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &str, message: String, fields: HashMap<String, String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            code: code.to_string(),
            message,
            path: None,
            field_errors: fields,
        }
    }
}

/// Implement IntoResponse for Axum integration
///
/// The rendered body carries no request path; the `error_envelope` middleware
/// re-renders it with the path filled in.
impl IntoResponse for WardenError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!("internal error: {}", detail);
        }

        let status = self.status_code();
        let body = ErrorBody::new(status, self.code(), self.client_message(), self.field_errors());

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Outermost middleware that stamps the request path onto error bodies
pub async fn error_envelope(req: axum::extract::Request, next: axum::middleware::Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if let Some(body) = response.extensions().get::<ErrorBody>() {
        let mut body = body.clone();
        body.path = Some(path);
        let status = response.status();
        return (status, Json(body)).into_response();
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WardenError::PasswordMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WardenError::LoginFailed.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WardenError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WardenError::AccessDenied("/x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WardenError::NotFound("role".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WardenError::DuplicateUsername.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WardenError::MissingDefaultRole("ROLE_USER".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_redacted() {
        let err = WardenError::Internal("connection string leaked".into());
        assert_eq!(err.client_message(), "internal server error");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_credential_failures_are_uniform() {
        // Unknown user and wrong password must be indistinguishable.
        assert_eq!(
            WardenError::LoginFailed.to_string(),
            "invalid username or password"
        );
        // Expired and malformed tokens must be indistinguishable.
        assert_eq!(
            WardenError::InvalidToken.to_string(),
            "invalid or expired token"
        );
    }

    #[test]
    fn test_validation_field() {
        let err = WardenError::validation_field("email", "not a valid email address");
        match &err {
            WardenError::Validation { field_errors, .. } => {
                assert_eq!(
                    field_errors.get("email").map(String::as_str),
                    Some("not a valid email address")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
