//! Collaborator traits consumed by the overtime workflow.
//!
//! The bodies of these traits belong to other subsystems (attendance,
//! overtime configuration, time exceptions, request persistence). The
//! workflow only depends on the interfaces, so any backend that implements
//! them can be plugged in. [`super::memory`] provides in-memory versions.
//!
//! Implementations report their own failures as
//! [`EngineError::Collaborator`](crate::error::EngineError::Collaborator).

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, OvertimeRequest, OvertimeRule, TimeException};

/// Read access to overtime rule configuration.
#[async_trait]
pub trait OvertimeRuleStore: Send + Sync {
    /// Returns the currently active rule, if any.
    ///
    /// When several rules are active the implementation picks one.
    async fn find_active(&self) -> EngineResult<Option<OvertimeRule>>;
}

/// Access to attendance records.
#[async_trait]
pub trait AttendanceRecordStore: Send + Sync {
    /// Looks up a record by identifier.
    async fn find_by_id(&self, id: &str) -> EngineResult<Option<AttendanceRecord>>;

    /// Persists a record, replacing any stored version.
    async fn save(&self, record: AttendanceRecord) -> EngineResult<()>;
}

/// Creates time exceptions in the exceptions subsystem.
#[async_trait]
pub trait ExceptionRecorder: Send + Sync {
    /// Records a new time exception.
    ///
    /// A second exception with the same `source_request_id` must be
    /// accepted without recording it again, so a retried approval never
    /// produces two exceptions.
    async fn create_exception(&self, exception: TimeException) -> EngineResult<()>;
}

/// Persistence for overtime requests.
#[async_trait]
pub trait OvertimeRequestStore: Send + Sync {
    /// Stores a new request. Fails if the identifier is already taken.
    async fn insert(&self, request: OvertimeRequest) -> EngineResult<()>;

    /// Replaces a stored request.
    async fn update(&self, request: OvertimeRequest) -> EngineResult<()>;

    /// Deletes a request. Removing an unknown id is not an error.
    async fn remove(&self, id: Uuid) -> EngineResult<()>;

    /// Looks up a request by identifier.
    async fn find_by_id(&self, id: Uuid) -> EngineResult<Option<OvertimeRequest>>;

    /// Returns the pending request for an attendance record, if any.
    async fn find_pending_for_record(
        &self,
        attendance_record_id: &str,
    ) -> EngineResult<Option<OvertimeRequest>>;
}
