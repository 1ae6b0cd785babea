use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy for the whole service. Each variant maps to one HTTP
/// status so callers can tell "fix your input" from "try again later".
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error("resource not found")]
    NotFound,

    /// The extraction capability answered, but its output failed validation.
    #[error("{0}")]
    ExtractionInvalid(String),

    /// Transport, auth or quota failure talking to the extraction capability.
    #[error("extraction service unavailable: {0}")]
    ExtractionUnavailable(String),

    #[error("failed to fetch page: {cause}")]
    FetchFailed { status: Option<u16>, cause: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation(message.into())
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::Internal(error.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ExtractionInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ExtractionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<diesel::result::Error> for AppError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => AppError::NotFound,
            _ => AppError::internal(value),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::internal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::http::StatusCode;

    #[test]
    fn maps_variants_to_expected_statuses() {
        assert_eq!(
            AppError::invalid_input("bad url").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::constraint("empty content").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ExtractionInvalid("missing title".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::ExtractionUnavailable("quota".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::FetchFailed {
                status: Some(500),
                cause: "upstream".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn diesel_not_found_becomes_not_found() {
        let err = AppError::from(diesel::result::Error::NotFound);
        assert!(matches!(err, AppError::NotFound));
    }
}
