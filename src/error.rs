//! Error types for the HR Policy Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading policy configuration
//! or driving the overtime request workflow.
//!
//! Rounding, eligibility and accrual are total functions and never produce
//! these errors; only configuration loading and the workflow do.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the HR Policy Engine.
///
/// # Example
///
/// ```
/// use hr_policy_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/workflow.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/workflow.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Leave policy code was not found in the configuration.
    #[error("Leave policy not found: {code}")]
    PolicyNotFound {
        /// The policy code that was not found.
        code: String,
    },

    /// No overtime rule is currently active.
    #[error("Cannot submit overtime without an active rule")]
    NoActiveOvertimeRule,

    /// The attendance record referenced by an overtime request does not exist.
    #[error("Attendance record not found: {id}")]
    AttendanceRecordNotFound {
        /// The attendance record identifier.
        id: String,
    },

    /// No overtime request exists with the given identifier.
    #[error("Overtime request not found: {id}")]
    OvertimeRequestNotFound {
        /// The overtime request identifier.
        id: Uuid,
    },

    /// A pending overtime request already exists for the attendance record.
    #[error(
        "Attendance record '{attendance_record_id}' already has pending overtime request {existing_request_id}"
    )]
    DuplicateOvertimeRequest {
        /// The attendance record identifier.
        attendance_record_id: String,
        /// The request that is still pending.
        existing_request_id: Uuid,
    },

    /// The overtime request is not in a state that allows the transition.
    #[error("Invalid status transition for overtime request {id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// The overtime request identifier.
        id: Uuid,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// An overtime request carried invalid data.
    #[error("Invalid overtime request field '{field}': {message}")]
    InvalidOvertimeRequest {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A collaborator (store or recorder) failed.
    #[error("Collaborator failure during {operation}: {message}")]
    Collaborator {
        /// The collaborator operation that failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// A collaborator call did not complete within the configured timeout.
    #[error("Collaborator timed out during {operation}")]
    CollaboratorTimeout {
        /// The collaborator operation that timed out.
        operation: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
