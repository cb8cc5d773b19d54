use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::db::services::TagServiceError;
use crate::services::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {msg}"))
            }
            AppError::StorageError(msg) => {
                error!(error = %msg, "Storage error while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::InternalServerError(msg) => {
                error!(error = %msg, "Internal error while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<TagServiceError> for AppError {
    fn from(err: TagServiceError) -> Self {
        match err {
            TagServiceError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            TagServiceError::DuplicateName(_) => {
                AppError::UnprocessableEntity("Tag title has already existed in database!".to_string())
            }
            TagServiceError::InvalidInput(msg) => AppError::InvalidInput(msg),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileName(_) => AppError::InvalidInput(err.to_string()),
            StorageError::NotFound(_) => AppError::NotFound(err.to_string()),
            StorageError::Write { ref source, .. } | StorageError::DirectoryCreation { ref source, .. } => {
                AppError::StorageError(format!("{err}: {source}"))
            }
        }
    }
}
