//! Error types for the seat tracker service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors that can occur in the seat tracker service
#[derive(Debug, thiserror::Error)]
pub enum SeatError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SeatError {
    /// Machine-readable error kind reported to HTTP callers
    pub fn kind(&self) -> &'static str {
        match self {
            SeatError::InvalidInput(_) => "invalid_input",
            SeatError::Persistence(_) => "persistence",
            SeatError::NotFound(_) => "not_found",
            SeatError::Config(_) => "config",
            SeatError::Io(_) => "io",
            SeatError::Json(_) => "json",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SeatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SeatError::NotFound(_) => StatusCode::NOT_FOUND,
            SeatError::Persistence(_)
            | SeatError::Config(_)
            | SeatError::Io(_)
            | SeatError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for SeatError {
    fn from(err: rusqlite::Error) -> Self {
        SeatError::Persistence(err.to_string())
    }
}

impl IntoResponse for SeatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for seat tracker operations
pub type Result<T> = std::result::Result<T, SeatError>;
