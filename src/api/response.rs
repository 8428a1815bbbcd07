//! Response types for the HR Policy Engine API.
//!
//! This module defines the success bodies, the error response structure and
//! the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::EligibilityCriterion;
use crate::error::EngineError;
use crate::models::{AuditStep, AuditTrace};

/// Response body for the `/round` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResponse {
    /// The rounded value.
    pub value: Decimal,
}

/// Response body for the `/eligibility` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    /// Code of the evaluated policy.
    pub policy_code: String,
    /// Whether the employee qualifies.
    pub eligible: bool,
    /// Every criterion the employee failed.
    pub failed_criteria: Vec<EligibilityCriterion>,
    /// Tenure in 30-day months at evaluation time.
    pub tenure_months: Decimal,
    /// The recorded evaluation.
    pub audit_step: AuditStep,
}

/// Response body for the `/accrual` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualResponse {
    /// Code of the policy accrued for.
    pub policy_code: String,
    /// The amount to credit, after rounding.
    pub amount: Decimal,
    /// The amount before rounding.
    pub raw_amount: Decimal,
    /// Whole periods counted.
    pub periods_elapsed: i64,
    /// Steps, warnings and timing of the calculation.
    pub audit_trace: AuditTrace,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a policy not found error response.
    pub fn policy_not_found(code: &str) -> Self {
        Self::with_details(
            "POLICY_NOT_FOUND",
            format!("Leave policy not found: {}", code),
            format!("No leave policy with code '{}' is configured", code),
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a 400 response carrying a validation error.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::PolicyNotFound { code } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::policy_not_found(&code),
            },
            EngineError::NoActiveOvertimeRule => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new("NO_ACTIVE_OVERTIME_RULE", message),
            },
            EngineError::AttendanceRecordNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("ATTENDANCE_RECORD_NOT_FOUND", message),
            },
            EngineError::OvertimeRequestNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("OVERTIME_REQUEST_NOT_FOUND", message),
            },
            EngineError::DuplicateOvertimeRequest {
                existing_request_id,
                ..
            } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "DUPLICATE_OVERTIME_REQUEST",
                    message,
                    format!("Review request {} before submitting another", existing_request_id),
                ),
            },
            EngineError::InvalidStatusTransition { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "INVALID_STATUS_TRANSITION",
                    message,
                    "Only pending overtime requests can be reviewed",
                ),
            },
            EngineError::InvalidOvertimeRequest { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::validation_error(message),
            },
            EngineError::Collaborator { .. } => ApiErrorResponse {
                status: StatusCode::BAD_GATEWAY,
                error: ApiError::new("COLLABORATOR_ERROR", message),
            },
            EngineError::CollaboratorTimeout { .. } => ApiErrorResponse {
                status: StatusCode::GATEWAY_TIMEOUT,
                error: ApiError::new("COLLABORATOR_TIMEOUT", message),
            },
        }
    }
}
