//! HTTP API module for the HR Policy Engine.
//!
//! This module provides REST endpoints for rounding, eligibility, accrual
//! and the overtime request workflow.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AccrualRequest, CreateOvertimeRequest, EligibilityRequest, PolicySelectionError,
    PolicySelector, ReviewOvertimeRequest, RoundRequest,
};
pub use response::{AccrualResponse, ApiError, ApiErrorResponse, EligibilityResponse, RoundResponse};
pub use state::AppState;
