//! HTTP request handlers for the HR Policy Engine API.
//!
//! This module contains the handler functions for all API endpoints. The
//! handlers only marshal JSON and read the wall clock; every decision is made
//! by the calculation functions or the overtime workflow.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{calculate_accrual_detailed, evaluate_eligibility, round};
use crate::error::EngineError;
use crate::models::AuditTrace;

use super::request::{
    AccrualRequest, CreateOvertimeRequest, EligibilityRequest, PolicySelectionError,
    ReviewOvertimeRequest, RoundRequest,
};
use super::response::{
    AccrualResponse, ApiError, ApiErrorResponse, EligibilityResponse, RoundResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/round", post(round_handler))
        .route("/eligibility", post(eligibility_handler))
        .route("/accrual", post(accrual_handler))
        .route("/overtime-requests", post(create_overtime_handler))
        .route("/overtime-requests/:id", get(get_overtime_handler))
        .route("/overtime-requests/:id/review", post(review_overtime_handler))
        .with_state(state)
}

/// Handler for POST /round.
async fn round_handler(payload: Result<Json<RoundRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing rounding request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let value = round(request.value, &request.rule);
    json_response(StatusCode::OK, RoundResponse { value })
}

/// Handler for POST /eligibility.
///
/// Evaluates an employee against an inline or configured policy at the
/// current time.
async fn eligibility_handler(
    State(state): State<AppState>,
    payload: Result<Json<EligibilityRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing eligibility request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let policy = match request.policy.resolve(state.config()) {
        Ok(policy) => policy,
        Err(err) => return policy_selection_response(correlation_id, err),
    };

    let start_time = Instant::now();
    let result = evaluate_eligibility(&request.employee, &policy, Utc::now(), 1);

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee.id,
        policy_code = %policy.code,
        eligible = result.eligible,
        duration_us = start_time.elapsed().as_micros(),
        "Eligibility evaluated"
    );

    json_response(
        StatusCode::OK,
        EligibilityResponse {
            policy_code: policy.code,
            eligible: result.eligible,
            failed_criteria: result.failed_criteria,
            tenure_months: result.tenure_months,
            audit_step: result.audit_step,
        },
    )
}

/// Handler for POST /accrual.
///
/// Computes the amount accrued between `last_accrual` and now.
async fn accrual_handler(
    State(state): State<AppState>,
    payload: Result<Json<AccrualRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing accrual request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let policy = match request.policy.resolve(state.config()) {
        Ok(policy) => policy,
        Err(err) => return policy_selection_response(correlation_id, err),
    };

    let start_time = Instant::now();
    let result = calculate_accrual_detailed(&policy, request.last_accrual, Utc::now(), 1);
    let duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        correlation_id = %correlation_id,
        policy_code = %policy.code,
        amount = %result.amount,
        periods_elapsed = result.periods_elapsed,
        warnings = result.warnings.len(),
        duration_us,
        "Accrual calculated"
    );

    json_response(
        StatusCode::OK,
        AccrualResponse {
            policy_code: policy.code,
            amount: result.amount,
            raw_amount: result.raw_amount,
            periods_elapsed: result.periods_elapsed,
            audit_trace: AuditTrace {
                steps: result.audit_steps,
                warnings: result.warnings,
                duration_us,
            },
        },
    )
}

/// Handler for POST /overtime-requests.
async fn create_overtime_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateOvertimeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing overtime submission");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state.workflow().create(request.into(), Utc::now()).await {
        Ok(ack) => {
            info!(
                correlation_id = %correlation_id,
                request_id = %ack.request_id,
                duration_us = start_time.elapsed().as_micros(),
                "Overtime submission accepted"
            );
            json_response(StatusCode::CREATED, ack)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /overtime-requests/:id/review.
async fn review_overtime_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ReviewOvertimeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing overtime review");

    let request_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state
        .workflow()
        .review(request_id, request.into(), Utc::now())
        .await
    {
        Ok(ack) => {
            info!(
                correlation_id = %correlation_id,
                request_id = %request_id,
                status = %ack.request.status,
                duration_us = start_time.elapsed().as_micros(),
                "Overtime review applied"
            );
            json_response(StatusCode::OK, ack)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /overtime-requests/:id.
async fn get_overtime_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.workflow().get(request_id).await {
        Ok(request) => json_response(StatusCode::OK, request),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    json_response(api_error.status, api_error.error)
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    error_response(err.into())
}

fn policy_selection_response(correlation_id: Uuid, err: PolicySelectionError) -> Response {
    match err {
        PolicySelectionError::Missing => {
            warn!(correlation_id = %correlation_id, "Request named no policy");
            error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
                "Either policy or policy_code is required",
            )))
        }
        PolicySelectionError::Engine(err) => engine_error_response(correlation_id, err),
    }
}

fn path_rejection_response(correlation_id: Uuid, rejection: PathRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid path parameter"
    );
    error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
        body_text,
    )))
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    error_response(ApiErrorResponse::bad_request(error))
}
