//! Request types for the HR Policy Engine API.
//!
//! This module defines the JSON request structures for every endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigLoader;
use crate::error::EngineError;
use crate::models::{
    Employee, LeavePolicy, NewOvertimeRequest, ReviewDecision, ReviewStatus, RoundingRule,
};

/// Request body for the `/round` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRequest {
    /// The value to round.
    pub value: Decimal,
    /// The rounding rule (e.g., "ROUND_UP").
    pub rule: RoundingRule,
}

/// Selects the policy to evaluate: either inline or by configured code.
///
/// When both are given the inline policy wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySelector {
    /// A complete policy supplied by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<LeavePolicy>,
    /// The code of a policy loaded from configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_code: Option<String>,
}

/// Why a [`PolicySelector`] could not be resolved.
#[derive(Debug)]
pub enum PolicySelectionError {
    /// Neither `policy` nor `policy_code` was given.
    Missing,
    /// The code does not name a configured policy.
    Engine(EngineError),
}

impl PolicySelector {
    /// Resolves the selector against the loaded configuration.
    pub fn resolve(self, config: &ConfigLoader) -> Result<LeavePolicy, PolicySelectionError> {
        match (self.policy, self.policy_code) {
            (Some(policy), _) => Ok(policy),
            (None, Some(code)) => config
                .get_policy(&code)
                .cloned()
                .map_err(PolicySelectionError::Engine),
            (None, None) => Err(PolicySelectionError::Missing),
        }
    }
}

/// Request body for the `/eligibility` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    /// The employee to evaluate.
    pub employee: Employee,
    /// The policy to evaluate against.
    #[serde(flatten)]
    pub policy: PolicySelector,
}

/// Request body for the `/accrual` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualRequest {
    /// The policy to accrue for.
    #[serde(flatten)]
    pub policy: PolicySelector,
    /// When the entitlement was last credited.
    pub last_accrual: DateTime<Utc>,
}

/// Request body for `POST /overtime-requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOvertimeRequest {
    /// The employee requesting overtime.
    pub employee_id: String,
    /// The attendance record the overtime applies to.
    pub attendance_record_id: String,
    /// Until when the employee intends to work.
    pub requested_until: DateTime<Utc>,
    /// Why overtime is needed.
    pub reason: String,
}

/// Request body for `POST /overtime-requests/:id/review`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOvertimeRequest {
    /// The decision, "APPROVED" or "REJECTED".
    pub status: ReviewStatus,
    /// Optional reviewer comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<CreateOvertimeRequest> for NewOvertimeRequest {
    fn from(req: CreateOvertimeRequest) -> Self {
        NewOvertimeRequest {
            employee_id: req.employee_id,
            attendance_record_id: req.attendance_record_id,
            requested_until: req.requested_until,
            reason: req.reason,
        }
    }
}

impl From<ReviewOvertimeRequest> for ReviewDecision {
    fn from(req: ReviewOvertimeRequest) -> Self {
        ReviewDecision {
            status: req.status,
            comment: req.comment,
        }
    }
}
