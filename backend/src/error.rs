//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::services::ServiceError;
use crate::state::ConfigStoreError;
use crate::workflow::OnboardingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Every handler returns this type. Adapter failures arrive as [`ServiceError`]
/// and are sorted into the variant matching their HTTP status.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body or query failed validation
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Client record with the given ID was not found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// A required service is not configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// An external service call failed
    #[error("Upstream service request failed: {0}")]
    Upstream(ServiceError),

    /// The onboarding workflow aborted at one of its steps
    #[error("Client onboarding failed: {0}")]
    Onboarding(#[from] OnboardingError),

    /// Reading or writing `apiConfig.json` failed
    #[error("Config store error: {0}")]
    ConfigStore(#[from] ConfigStoreError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => AppError::Validation(msg),
            ServiceError::NotConfigured(what) => {
                AppError::Config(format!("{} is not configured", what))
            }
            other => AppError::Upstream(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ClientNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Onboarding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_mapping() {
        let err = AppError::from(ServiceError::InvalidInput("email is required".to_string()));
        assert!(matches!(err, AppError::Validation(_)));

        let err = AppError::from(ServiceError::NotConfigured("SMTP"));
        match err {
            AppError::Config(msg) => assert_eq!(msg, "SMTP is not configured"),
            other => panic!("Expected Config error, got: {:?}", other),
        }

        let err = AppError::from(ServiceError::Http {
            service: "drive",
            status: 403,
            body: "forbidden".to_string(),
        });
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn test_status_codes() {
        let response = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::ClientNotFound("c-1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Upstream(ServiceError::Decode {
            service: "zoho",
            message: "eof".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
