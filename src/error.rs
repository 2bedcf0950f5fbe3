use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, keyed by field name. BTreeMap keeps the
/// serialized order stable for clients and tests.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// ApiError
///
/// The full error taxonomy of the HTTP surface. Every failure a handler can
/// produce maps onto one of these variants, and every variant maps onto
/// exactly one status code and JSON body shape in `IntoResponse`.
///
/// `NotFound` deliberately collapses "row does not exist" and "requester may
/// not touch this row" into one indistinguishable response, so the API never
/// leaks the existence of another user's content.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing fields; carries per-field messages (400).
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Email already registered (400).
    #[error("email already registered")]
    DuplicateEmail,

    /// Document rejected by the upload gate (400).
    #[error("Only PDF files are allowed.")]
    UnsupportedUpload,

    /// Missing, malformed, or expired bearer token (401).
    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,

    /// Known email, wrong password (401). Login only.
    #[error("Incorrect password")]
    BadCredentials,

    /// Unknown email at login (404). Login only.
    #[error("User not found")]
    UserNotFound,

    /// Absent resource or unauthorized access, indistinguishable (404).
    #[error("Not found or unauthorized.")]
    NotFound,

    /// Anything unexpected from a collaborator; cause is logged, not echoed (500).
    #[error("Internal server error")]
    Internal,
}

impl From<crate::repository::RepoError> for ApiError {
    fn from(err: crate::repository::RepoError) -> Self {
        match err {
            crate::repository::RepoError::DuplicateEmail => ApiError::DuplicateEmail,
            crate::repository::RepoError::Database(_) => ApiError::Internal,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail | ApiError::UnsupportedUpload => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized | ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::UserNotFound | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            // Field errors serialize as {"field": ["message", ...]}, the shape
            // clients already bind their form errors to.
            ApiError::Validation(errors) => json!(errors),
            ApiError::DuplicateEmail => {
                json!({ "email": ["A user with this email already exists."] })
            }
            other => json!({ "detail": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
