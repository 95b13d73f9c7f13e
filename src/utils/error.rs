use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Pressure is missing or not a number")]
    InvalidPressureFormat,

    #[error("Incorrect pressure: {value}")]
    InvalidPressure { value: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {field}: {reason}")]
    ConfigError { field: String, reason: String },
}

impl ApiError {
    /// Status written to the client. Input errors are deliberately not
    /// distinguished from server faults.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Errors caused by the request itself rather than by the service.
    pub fn is_client_input(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidPressureFormat | ApiError::InvalidPressure { .. }
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_client_input() {
            tracing::debug!("Rejected request: {}", self);
        } else {
            tracing::error!("Request failed: {}", self);
        }
        self.status_code().into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
