//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps entry-flow, store and integration errors to HTTP status codes with
//! a JSON body of `{"error": {"code", "message", "details?"}}`.
//! Internal error messages are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sweeps_entry::{StoreError, SubmissionError};
use sweeps_integrations::IntegrationError;
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details. Set for field validation failures as
    /// `{"field": "<name>"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// A named input field failed validation (422).
    #[error("validation error: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Request body or query could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid admin token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A third-party integration answered with an error (502).
    #[error("upstream error: {0}")]
    BadGateway(String),

    /// A required collaborator is not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) | Self::InvalidField { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::BadGateway(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::BadGateway(_) => tracing::warn!(error = %self, "upstream integration error"),
            _ => {}
        }

        let mut body = ErrorBody::new(code, message);
        if let Self::InvalidField { field, .. } = &self {
            body.error.details = Some(serde_json::json!({ "field": field }));
        }

        (status, Json(body)).into_response()
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Invalid(e) => Self::InvalidField {
                field: e.field(),
                message: e.to_string(),
            },
            SubmissionError::CampaignNotFound(id) => {
                Self::NotFound(format!("campaign {id} does not exist"))
            }
            SubmissionError::Store { ref source, .. } if source.is_referral_code_collision() => {
                Self::Conflict("generated referral code collided, please submit again".into())
            }
            SubmissionError::Store { ref source, .. } if source.is_unique_violation() => {
                Self::Conflict("an entry for this email already exists".into())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                Self::Conflict(format!("unique constraint {constraint} violated"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<IntegrationError> for AppError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotConfigured(_) => Self::ServiceUnavailable(err.to_string()),
            e if e.is_upstream() => Self::BadGateway(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use sweeps_core::ValidationError;
    use sweeps_entry::SubmissionStage;
    use sweeps_integrations::Integration;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn invalid_submission_is_422() {
        let err = AppError::from(SubmissionError::Invalid(ValidationError::InvalidEmail(
            "nope".into(),
        )));
        assert_eq!(err.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_campaign_is_404() {
        let err = AppError::from(SubmissionError::CampaignNotFound("default".into()));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn lost_dedup_race_is_409() {
        let err = AppError::from(SubmissionError::Store {
            stage: SubmissionStage::Writing,
            source: StoreError::UniqueViolation {
                constraint: "entries_email_key".into(),
            },
        });
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn referral_code_collision_asks_for_retry() {
        let (status, body) = response_parts(AppError::from(SubmissionError::Store {
            stage: SubmissionStage::Writing,
            source: StoreError::UniqueViolation {
                constraint: sweeps_entry::REFERRAL_CODE_UNIQUE_CONSTRAINT.into(),
            },
        }))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.error.message.contains("submit again"));
        assert!(!body.error.message.contains("already exists"));
    }

    #[tokio::test]
    async fn invalid_field_is_reported_in_details() {
        let err = AppError::from(SubmissionError::Invalid(ValidationError::Empty {
            field: "last_name",
        }));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        assert_eq!(body.error.details.unwrap()["field"], "last_name");
    }

    #[test]
    fn store_failure_is_500() {
        let err = AppError::from(SubmissionError::Store {
            stage: SubmissionStage::CheckingExisting,
            source: StoreError::Unavailable("pool timed out".into()),
        });
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn integration_errors_map_to_gateway_statuses() {
        let not_configured = AppError::from(IntegrationError::NotConfigured(Integration::EmailList));
        assert_eq!(not_configured.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);

        let upstream = AppError::from(IntegrationError::Api {
            endpoint: "POST /lists/{list_id}/members".into(),
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(upstream.status_and_code().0, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let (status, body) = response_parts(AppError::Internal("db password wrong".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = response_parts(AppError::Validation("email is invalid".into())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.message.contains("email is invalid"));
        assert!(body.error.details.is_none());
    }
}
