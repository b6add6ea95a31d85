// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

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

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate email)
    Conflict(String),

    // 409 - a permanent QuizResult already exists for (user, lesson)
    AlreadyCompleted,

    // 429 - hourly or daily attempt budget exhausted
    RateLimited(String),

    // 429 - carries the remaining cooldown in whole seconds
    CooldownActive(i64),

    // 400 - recorded lesson read time below the configured minimum
    InsufficientReadTime { required: i64, recorded: i64 },

    // 404 - missing or undersized question pool
    ConfigurationError(String),

    // 400 - the attempt already has a completion timestamp
    AlreadySubmitted,

    // 400 - submitted question ids do not match the frozen set
    AnswerMismatch,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::AlreadyCompleted => (
                StatusCode::CONFLICT,
                json!({ "error": "Quiz already completed for this lesson" }),
            ),
            AppError::RateLimited(reason) => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": reason }),
            ),
            AppError::CooldownActive(remaining) => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": format!("Cooldown active, retry in {} seconds", remaining),
                    "cooldown_remaining": remaining,
                }),
            ),
            AppError::InsufficientReadTime { required, recorded } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": format!(
                        "Lesson must be read for at least {} seconds before attempting the quiz ({} recorded)",
                        required, recorded
                    ),
                }),
            ),
            AppError::ConfigurationError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::AlreadySubmitted => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Attempt already submitted" }),
            ),
            AppError::AnswerMismatch => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Submitted answers do not match the questions of this attempt" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Allows using the `?` operator on store calls inside handlers.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Record not found".to_string()),
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            StoreError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
