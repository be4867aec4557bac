//! Custom error types for the to-do API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the to-do API
///
/// Every variant maps to a terminal JSON error response; no error is fatal to
/// the process. Mutations only run after all guards pass, so no variant ever
/// leaves partial effects behind.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// Registration with a username that is already taken
    #[error("Username already exists")]
    UsernameTaken,

    /// Pro upgrade requested for a user that is already pro
    #[error("Pro plan is already activated.")]
    AlreadyPro,

    /// Todo id in the request path is not a syntactically valid UUID
    #[error("Id in request parameters is not a valid UUID")]
    InvalidTodoId,

    /// Free-plan user at the todo limit
    #[error("You have reached the limit of free todos, sign Premium for more.")]
    QuotaExceeded,

    /// No user matches the identity claim or path id
    #[error("User not found")]
    UserNotFound,

    /// No todo with the given id in the owner's collection
    #[error("Todo not found")]
    TodoNotFound,
}

impl ApiError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UsernameTaken | ApiError::AlreadyPro | ApiError::InvalidTodoId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::QuotaExceeded => StatusCode::FORBIDDEN,
            ApiError::UserNotFound | ApiError::TodoNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
