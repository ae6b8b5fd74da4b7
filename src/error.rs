//! Error types for the OCR Service gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pool::PoolError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("OCR processing failed: {0}")]
    Pool(#[from] PoolError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Pool(PoolError::Ocr(e)) if e.is_input_error() => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unreadable_image")
            }
            AppError::Pool(PoolError::Ocr(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "engine_error"),
            AppError::Pool(PoolError::ShutDown) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            AppError::Pool(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.parts();

        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", error_type, self);
        } else {
            tracing::debug!("Request rejected ({}): {}", error_type, self);
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details: if cfg!(debug_assertions) {
                Some(format!("{:?}", self))
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
