//! Overtime request entity and its status transitions.
//!
//! An [`OvertimeRequest`] starts out [`OvertimeStatus::Pending`] and moves to
//! exactly one terminal status through [`OvertimeRequest::apply_review`]:
//!
//! ```text
//! Pending ──review(APPROVED)──> Approved
//!    │
//!    └────review(REJECTED)──> Rejected
//! ```
//!
//! A review decision can only name a terminal status, so "review to pending"
//! is unrepresentable. Reviewing a terminal request is rejected with
//! [`EngineError::InvalidStatusTransition`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of an overtime request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OvertimeStatus {
    /// Awaiting review.
    Pending,
    /// Approved; a time exception has been recorded.
    Approved,
    /// Rejected.
    Rejected,
}

impl OvertimeStatus {
    /// Returns true for statuses that cannot change any more.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OvertimeStatus::Pending)
    }

    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            OvertimeStatus::Pending => "PENDING",
            OvertimeStatus::Approved => "APPROVED",
            OvertimeStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for OvertimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome a reviewer can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    /// Approve the overtime.
    Approved,
    /// Reject the overtime.
    Rejected,
}

impl From<ReviewStatus> for OvertimeStatus {
    fn from(status: ReviewStatus) -> Self {
        match status {
            ReviewStatus::Approved => OvertimeStatus::Approved,
            ReviewStatus::Rejected => OvertimeStatus::Rejected,
        }
    }
}

/// A reviewer's decision on an overtime request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    /// The chosen outcome.
    pub status: ReviewStatus,
    /// Optional reviewer comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Input for submitting a new overtime request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOvertimeRequest {
    /// The employee requesting overtime.
    pub employee_id: String,
    /// The attendance record the overtime applies to.
    pub attendance_record_id: String,
    /// Until when the employee intends to work.
    pub requested_until: DateTime<Utc>,
    /// Why overtime is needed.
    pub reason: String,
}

/// A durable overtime request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRequest {
    /// Unique identifier of the request.
    pub id: Uuid,
    /// The employee requesting overtime.
    pub employee_id: String,
    /// The attendance record the overtime applies to.
    pub attendance_record_id: String,
    /// Until when the employee intends to work.
    pub requested_until: DateTime<Utc>,
    /// Why overtime is needed.
    pub reason: String,
    /// Current status.
    pub status: OvertimeStatus,
    /// Comment left by the reviewer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the request was reviewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl OvertimeRequest {
    /// Creates a pending request with a fresh identifier.
    pub fn pending(input: NewOvertimeRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            attendance_record_id: input.attendance_record_id,
            requested_until: input.requested_until,
            reason: input.reason,
            status: OvertimeStatus::Pending,
            review_comment: None,
            created_at: now,
            reviewed_at: None,
        }
    }

    /// Moves a pending request to the status named by `decision`.
    ///
    /// Returns [`EngineError::InvalidStatusTransition`] if the request has
    /// already been reviewed; the request is left untouched in that case.
    pub fn apply_review(
        &mut self,
        decision: &ReviewDecision,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let target = OvertimeStatus::from(decision.status);
        if self.status.is_terminal() {
            return Err(EngineError::InvalidStatusTransition {
                id: self.id,
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }

        self.status = target;
        self.review_comment = decision.comment.clone();
        self.reviewed_at = Some(now);
        Ok(())
    }
}

/// Acknowledgment returned when an overtime request is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRequestAck {
    /// Identifier of the stored request.
    pub request_id: Uuid,
    /// Status of the stored request (always pending).
    pub status: OvertimeStatus,
    /// Human-readable message for the submitter.
    pub message: String,
}

/// Acknowledgment returned when an overtime request is reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAck {
    /// Always true on success.
    pub updated: bool,
    /// The request after the review.
    pub request: OvertimeRequest,
}
