// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::AttemptError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., attempt already completed)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps engine outcomes onto HTTP semantics.
/// Storage details stay in the logs; callers only see a generic failure.
impl From<AttemptError> for AppError {
    fn from(err: AttemptError) -> Self {
        let message = err.to_string();
        match err {
            AttemptError::QuizNotFound | AttemptError::NotFound => AppError::NotFound(message),
            AttemptError::NotOwner => AppError::Forbidden(message),
            AttemptError::QuizInactive
            | AttemptError::QuizEmpty
            | AttemptError::AlreadyCompleted => AppError::Conflict(message),
            AttemptError::IncompleteSubmission { .. } | AttemptError::InvalidTopCount(_) => {
                AppError::BadRequest(message)
            }
            AttemptError::Storage(_) => AppError::InternalServerError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;

    fn status_of(err: AttemptError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_attempt_errors_map_to_status() {
        assert_eq!(status_of(AttemptError::QuizNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AttemptError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AttemptError::NotOwner), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AttemptError::QuizInactive), StatusCode::CONFLICT);
        assert_eq!(status_of(AttemptError::QuizEmpty), StatusCode::CONFLICT);
        assert_eq!(status_of(AttemptError::AlreadyCompleted), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AttemptError::IncompleteSubmission {
                expected: 2,
                received: 1
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AttemptError::InvalidTopCount(0)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AttemptError::Storage(RepositoryError::Unavailable(
                "down".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
