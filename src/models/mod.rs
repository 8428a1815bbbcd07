//! Core data models for the HR Policy Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod employee;
mod overtime;
mod policy;

pub use attendance::{AttendanceRecord, OvertimeRule, TimeException, TimeExceptionType};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use employee::Employee;
pub use overtime::{
    NewOvertimeRequest, OvertimeRequest, OvertimeRequestAck, OvertimeStatus, ReviewAck,
    ReviewDecision, ReviewStatus,
};
pub use policy::{AccrualMethod, EligibilityRules, LeavePolicy, RoundingRule};
