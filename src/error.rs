use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use tracing::error;

use crate::core::{CoreError, ValidationError};
use crate::models::ErrorResponse;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Model or feature tables failed to load at startup
    ModelNotLoaded,
    /// Feature tables returned zero or several rows
    UpstreamDataError(String),
    /// Prediction oracle failed
    OracleError(String),
    /// Portfolio solver failed
    OptimizationError(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ModelNotLoaded => write!(f, "Model not loaded"),
            AppError::UpstreamDataError(msg) => write!(f, "Upstream data error: {}", msg),
            AppError::OracleError(msg) => write!(f, "Prediction error: {}", msg),
            AppError::OptimizationError(msg) => write!(f, "Optimization error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(reason) => AppError::ValidationError(reason.to_string()),
            CoreError::UpstreamData(msg) => AppError::UpstreamDataError(msg),
            CoreError::Oracle(msg) => AppError::OracleError(msg),
            CoreError::Optimization(msg) => AppError::OptimizationError(msg),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamDataError(_)
            | AppError::OracleError(_)
            | AppError::OptimizationError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Server-side detail stays in the logs
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::ModelNotLoaded => (
                "model_not_loaded",
                "Prediction model is not available".to_string(),
            ),
            AppError::UpstreamDataError(_) => (
                "upstream_data_error",
                "Reference data for this matchup is missing or ambiguous".to_string(),
            ),
            AppError::OracleError(_) => ("prediction_error", "Prediction failed".to_string()),
            AppError::OptimizationError(_) => (
                "optimization_error",
                "Portfolio optimization failed".to_string(),
            ),
            AppError::InternalError(_) => ("internal_error", "Internal server error".to_string()),
        };

        if self.status_code().is_server_error() {
            error!("{}", self);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_display() {
        let err = AppError::ValidationError("test error".to_string());
        assert!(err.to_string().contains("Validation error"));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::ValidationError("".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ModelNotLoaded.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::UpstreamDataError("".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::OracleError("".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::OptimizationError("".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let err: AppError = CoreError::from(ValidationError::ZeroMargin).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = CoreError::Optimization("diverged".to_string()).into();
        assert!(matches!(err, AppError::OptimizationError(_)));
    }

    #[actix_web::test]
    async fn test_server_error_detail_is_redacted() {
        let err = AppError::UpstreamDataError("pitching.csv returned 2 rows".to_string());
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let response: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(response.error, "upstream_data_error");
        assert!(!response.message.contains("pitching.csv"));
    }

    #[actix_web::test]
    async fn test_validation_detail_is_returned() {
        let err = AppError::from(ValidationError::EmptyBatch);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let response: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(response.error, "validation_error");
        assert_eq!(response.message, "at least one bet is required");
    }
}
