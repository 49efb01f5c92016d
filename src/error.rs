use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Video {0} not found")]
    VideoNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Stable machine-readable tag carried in every error body
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Store(_) => "upstream_error",
            AppError::PasswordHash(_) | AppError::TaskJoin(_) | AppError::Internal(_) => {
                "internal_error"
            }
            AppError::UserAlreadyExists => "conflict",
            AppError::UserNotFound => "user_not_found",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::VideoNotFound(_) => "not_found",
            AppError::InvalidInput(_) => "validation_error",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match self {
            AppError::Store(ref e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream store error".to_string(),
                )
            }
            AppError::PasswordHash(ref e) => {
                tracing::error!("Password hashing error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::UserAlreadyExists => (StatusCode::CONFLICT, "User already exists".to_string()),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::VideoNotFound(ref id) => {
                let body = Json(json!({
                    "error": "Video not found",
                    "type": kind,
                    "videoId": id,
                }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
            "type": kind,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
