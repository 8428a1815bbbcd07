//! Attendance-side records touched by the overtime workflow.
//!
//! These types are owned by other subsystems (attendance, time exceptions,
//! overtime configuration). The engine only reads them or creates them
//! through the collaborator traits in [`crate::workflow`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An attendance record as seen by the overtime workflow.
///
/// `finalised_for_payroll` is read by payroll to decide whether the period
/// can be closed. Creating an overtime request clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: String,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// Whether payroll has closed the period covering this record.
    #[serde(default)]
    pub finalised_for_payroll: bool,
}

/// Configuration record whose `active` flag governs overtime submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRule {
    /// Unique identifier for the rule.
    pub id: String,
    /// Human-readable rule name.
    pub name: String,
    /// Whether the rule currently applies.
    pub active: bool,
}

/// The kind of deviation a [`TimeException`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeExceptionType {
    /// Overtime approved through an overtime request.
    OvertimeRequest,
}

/// A recorded deviation attached to an employee's attendance record.
///
/// `source_request_id` names the overtime request that produced the
/// exception. Recorders use it to ignore a repeated delivery.
///
/// # Example
///
/// ```
/// use hr_policy_engine::models::{TimeException, TimeExceptionType};
///
/// let exception = TimeException {
///     employee_id: "emp_001".to_string(),
///     attendance_record_id: "att_001".to_string(),
///     source_request_id: uuid::Uuid::new_v4(),
///     exception_type: TimeExceptionType::OvertimeRequest,
///     reason: "Approved overtime".to_string(),
/// };
/// let json = serde_json::to_value(&exception).unwrap();
/// assert_eq!(json["type"], "OVERTIME_REQUEST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeException {
    /// The employee the exception applies to.
    pub employee_id: String,
    /// The attendance record the exception is attached to.
    pub attendance_record_id: String,
    /// The overtime request that produced the exception.
    pub source_request_id: Uuid,
    /// The kind of exception.
    #[serde(rename = "type")]
    pub exception_type: TimeExceptionType,
    /// Why the exception exists.
    pub reason: String,
}
