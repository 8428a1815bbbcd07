//! In-memory collaborator implementations.
//!
//! Useful for tests, benchmarks and embedding the engine without a backing
//! database. State is lost when the value is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, OvertimeRequest, OvertimeRule, OvertimeStatus, TimeException,
};

use super::store::{
    AttendanceRecordStore, ExceptionRecorder, OvertimeRequestStore, OvertimeRuleStore,
};

/// Overtime rules held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryOvertimeRuleStore {
    rules: RwLock<Vec<OvertimeRule>>,
}

impl InMemoryOvertimeRuleStore {
    /// Creates a store holding `rules`.
    pub fn new(rules: Vec<OvertimeRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Sets the `active` flag of the rule with `id`. Returns false if absent.
    pub async fn set_active(&self, id: &str, active: bool) -> bool {
        let mut rules = self.rules.write().await;
        match rules.iter_mut().find(|rule| rule.id == id) {
            Some(rule) => {
                rule.active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl OvertimeRuleStore for InMemoryOvertimeRuleStore {
    async fn find_active(&self) -> EngineResult<Option<OvertimeRule>> {
        Ok(self.rules.read().await.iter().find(|rule| rule.active).cloned())
    }
}

/// Attendance records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceRecordStore {
    records: RwLock<HashMap<String, AttendanceRecord>>,
}

impl InMemoryAttendanceRecordStore {
    /// Creates a store holding `records`.
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
        }
    }

    /// Returns a copy of the stored record.
    pub async fn get(&self, id: &str) -> Option<AttendanceRecord> {
        self.records.read().await.get(id).cloned()
    }
}

#[async_trait]
impl AttendanceRecordStore for InMemoryAttendanceRecordStore {
    async fn find_by_id(&self, id: &str) -> EngineResult<Option<AttendanceRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: AttendanceRecord) -> EngineResult<()> {
        tracing::debug!(
            attendance_record_id = %record.id,
            finalised_for_payroll = record.finalised_for_payroll,
            "Attendance record saved"
        );
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }
}

/// Time exceptions collected in memory.
#[derive(Debug, Default)]
pub struct InMemoryExceptionRecorder {
    exceptions: RwLock<Vec<TimeException>>,
}

impl InMemoryExceptionRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded exception.
    pub async fn exceptions(&self) -> Vec<TimeException> {
        self.exceptions.read().await.clone()
    }

    /// Returns the exceptions attached to one attendance record.
    pub async fn exceptions_for_record(&self, attendance_record_id: &str) -> Vec<TimeException> {
        self.exceptions
            .read()
            .await
            .iter()
            .filter(|e| e.attendance_record_id == attendance_record_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ExceptionRecorder for InMemoryExceptionRecorder {
    async fn create_exception(&self, exception: TimeException) -> EngineResult<()> {
        let mut exceptions = self.exceptions.write().await;
        if exceptions
            .iter()
            .any(|e| e.source_request_id == exception.source_request_id)
        {
            tracing::debug!(
                source_request_id = %exception.source_request_id,
                "Time exception already recorded"
            );
            return Ok(());
        }

        tracing::debug!(
            employee_id = %exception.employee_id,
            attendance_record_id = %exception.attendance_record_id,
            reason = %exception.reason,
            "Time exception recorded"
        );
        exceptions.push(exception);
        Ok(())
    }
}

/// Overtime requests held in memory.
#[derive(Debug, Default)]
pub struct InMemoryOvertimeRequestStore {
    requests: RwLock<HashMap<Uuid, OvertimeRequest>>,
}

impl InMemoryOvertimeRequestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Returns true if no request is stored.
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait]
impl OvertimeRequestStore for InMemoryOvertimeRequestStore {
    async fn insert(&self, request: OvertimeRequest) -> EngineResult<()> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(EngineError::Collaborator {
                operation: "overtime_requests.insert".to_string(),
                message: format!("request {} already exists", request.id),
            });
        }
        requests.insert(request.id, request);
        Ok(())
    }

    async fn update(&self, request: OvertimeRequest) -> EngineResult<()> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&request.id) {
            Some(stored) => {
                *stored = request;
                Ok(())
            }
            None => Err(EngineError::OvertimeRequestNotFound { id: request.id }),
        }
    }

    async fn remove(&self, id: Uuid) -> EngineResult<()> {
        self.requests.write().await.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> EngineResult<Option<OvertimeRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn find_pending_for_record(
        &self,
        attendance_record_id: &str,
    ) -> EngineResult<Option<OvertimeRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .find(|r| {
                r.attendance_record_id == attendance_record_id
                    && r.status == OvertimeStatus::Pending
            })
            .cloned())
    }
}
