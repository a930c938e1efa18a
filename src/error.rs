//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned for every error
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::NotFound(message) | AppError::BadRequest(message) => ErrorResponse {
                success: false,
                message,
                errors: Vec::new(),
            },
            AppError::Validation { message, errors } => ErrorResponse {
                success: false,
                message,
                errors,
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ErrorResponse {
                    success: false,
                    message: "Database error".to_string(),
                    errors: Vec::new(),
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    success: false,
                    message: "Internal error".to_string(),
                    errors: Vec::new(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
