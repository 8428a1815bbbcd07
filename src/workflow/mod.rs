//! Overtime request workflow and its collaborators.
//!
//! This module contains the [`OvertimeRequestWorkflow`] state machine, the
//! collaborator traits it depends on, in-memory implementations of those
//! traits, and the per-record locks that serialize concurrent submissions.

pub mod memory;

mod locks;
mod overtime;
mod store;

pub use locks::{RecordGuard, RecordLocks};
pub use overtime::{
    APPROVED_OVERTIME_REASON, OvertimeRequestWorkflow, PENDING_APPROVAL_MESSAGE,
    WorkflowCollaborators,
};
pub use store::{AttendanceRecordStore, ExceptionRecorder, OvertimeRequestStore, OvertimeRuleStore};
