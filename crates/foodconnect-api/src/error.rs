use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use foodconnect_types::models::Role;

/// Every failure a handler can answer with. Rendered as
/// `{ "success": false, "message": ..., "error"?: ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed JSON, missing fields, values outside a closed set.
    #[error("{0}")]
    BadRequest(String),

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("No account found with this email")]
    AccountNotFound,

    #[error("This account is registered as {0}. Please select the correct user type.")]
    RoleMismatch(Role),

    #[error("Incorrect password")]
    InvalidCredential,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// The named record (or owner account) does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Cannot change status from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("{message}")]
    Internal {
        message: &'static str,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::DuplicateEmail | ApiError::RoleMismatch(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredential | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::AccountNotFound | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IllegalTransition { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });
        if let ApiError::Internal { detail: Some(detail), .. } = &self {
            body["error"] = json!(detail);
        }
        (self.status_code(), Json(body)).into_response()
    }
}
