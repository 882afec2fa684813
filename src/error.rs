//! Error types for the Presentia server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    StoreUnavailable = 2,
    AlreadyPresent = 3,
    SessionNotActive = 4,
    FacilityUnavailable = 5,
    VisitorUnknown = 6,
    NoSuchData = 7,
    BadValue = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Already present: {0}")]
    AlreadyPresent(String),

    #[error("Session not active: {0}")]
    SessionNotActive(String),

    #[error("Facility unavailable: {0}")]
    FacilityUnavailable(String),

    #[error("Unknown visitor: {0}")]
    VisitorUnknown(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::AlreadyPresent(msg) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyPresent, msg.clone())
            }
            AppError::SessionNotActive(msg) => {
                (StatusCode::CONFLICT, ErrorCode::SessionNotActive, msg.clone())
            }
            AppError::FacilityUnavailable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::FacilityUnavailable,
                msg.clone(),
            ),
            AppError::VisitorUnknown(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::VisitorUnknown, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::StoreUnavailable,
                    "Backing store unavailable".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
