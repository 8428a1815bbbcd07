//! Overtime request workflow.
//!
//! Submitting a request blocks payroll finalisation for the attendance
//! record; approving it records an `OVERTIME_REQUEST` time exception.
//!
//! ```text
//! create() ──> Pending ──review(APPROVED)──> Approved  (+ time exception)
//!                 │
//!                 └──────review(REJECTED)──> Rejected  (flag restored only if configured)
//! ```
//!
//! # Side effects of `create`
//!
//! 1. An active overtime rule must exist, otherwise nothing is touched.
//! 2. Under the attendance record's lock, the record must exist and must
//!    not already have a pending request.
//! 3. A pending [`OvertimeRequest`] is stored.
//! 4. `finalised_for_payroll` is cleared and the record saved. If the save
//!    fails, the stored request is removed and the original record written
//!    back.
//!
//! # Side effects of `review`
//!
//! The new status is persisted first. Only then is the time exception
//! recorded (approval) or the flag restored (rejection, when configured).
//! If that second write fails, the request is put back to pending so the
//! review can be retried. Exceptions carry the request id, and recorders
//! ignore a repeat, so a retry never records a second exception.
//!
//! Every collaborator call is bounded by
//! [`WorkflowConfig::collaborator_timeout`]; failures and timeouts are
//! returned to the caller. Compensating writes are best effort and only
//! logged when they fail themselves.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, NewOvertimeRequest, OvertimeRequest, OvertimeRequestAck, ReviewAck,
    ReviewDecision, ReviewStatus, TimeException, TimeExceptionType,
};

use super::locks::RecordLocks;
use super::store::{
    AttendanceRecordStore, ExceptionRecorder, OvertimeRequestStore, OvertimeRuleStore,
};

/// Message returned to the submitter of a new request.
pub const PENDING_APPROVAL_MESSAGE: &str = "Overtime request submitted and pending approval";

/// Reason recorded on the time exception created by an approval.
pub const APPROVED_OVERTIME_REASON: &str = "Approved overtime";

/// The collaborators the workflow reads from and writes to.
#[derive(Clone)]
pub struct WorkflowCollaborators {
    /// Overtime rule configuration.
    pub rules: Arc<dyn OvertimeRuleStore>,
    /// Attendance records.
    pub attendance: Arc<dyn AttendanceRecordStore>,
    /// Time exception sink.
    pub exceptions: Arc<dyn ExceptionRecorder>,
    /// Overtime request persistence.
    pub requests: Arc<dyn OvertimeRequestStore>,
}

/// Drives overtime requests from submission to review.
pub struct OvertimeRequestWorkflow {
    collaborators: WorkflowCollaborators,
    config: WorkflowConfig,
    locks: RecordLocks,
}

impl OvertimeRequestWorkflow {
    /// Creates a workflow over the given collaborators.
    pub fn new(collaborators: WorkflowCollaborators, config: WorkflowConfig) -> Self {
        Self {
            collaborators,
            config,
            locks: RecordLocks::new(),
        }
    }

    /// Returns the workflow settings.
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Submits an overtime request.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidOvertimeRequest`] if the reason is blank
    /// - [`EngineError::NoActiveOvertimeRule`] if no rule is active
    /// - [`EngineError::AttendanceRecordNotFound`] if the record is missing
    /// - [`EngineError::DuplicateOvertimeRequest`] if the record already has a
    ///   pending request
    /// - [`EngineError::Collaborator`] / [`EngineError::CollaboratorTimeout`]
    ///   if a collaborator fails or is too slow
    pub async fn create(
        &self,
        input: NewOvertimeRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<OvertimeRequestAck> {
        if input.reason.trim().is_empty() {
            return Err(EngineError::InvalidOvertimeRequest {
                field: "reason".to_string(),
                message: "must not be blank".to_string(),
            });
        }

        let rule = self
            .call("overtime_rules.find_active", self.collaborators.rules.find_active())
            .await?;
        let Some(rule) = rule else {
            warn!(
                employee_id = %input.employee_id,
                attendance_record_id = %input.attendance_record_id,
                "Overtime request refused, no active overtime rule"
            );
            return Err(EngineError::NoActiveOvertimeRule);
        };

        let _guard = self.locks.acquire(&input.attendance_record_id).await;

        let mut record = self
            .call(
                "attendance_records.find_by_id",
                self.collaborators.attendance.find_by_id(&input.attendance_record_id),
            )
            .await?
            .ok_or_else(|| EngineError::AttendanceRecordNotFound {
                id: input.attendance_record_id.clone(),
            })?;

        let existing = self
            .call(
                "overtime_requests.find_pending_for_record",
                self.collaborators
                    .requests
                    .find_pending_for_record(&input.attendance_record_id),
            )
            .await?;
        if let Some(existing) = existing {
            return Err(EngineError::DuplicateOvertimeRequest {
                attendance_record_id: input.attendance_record_id,
                existing_request_id: existing.id,
            });
        }

        let request = OvertimeRequest::pending(input, now);
        let request_id = request.id;
        let ack = OvertimeRequestAck {
            request_id,
            status: request.status,
            message: PENDING_APPROVAL_MESSAGE.to_string(),
        };

        self.call(
            "overtime_requests.insert",
            self.collaborators.requests.insert(request.clone()),
        )
        .await?;

        let original = record.clone();
        record.finalised_for_payroll = false;
        if let Err(err) = self
            .call(
                "attendance_records.save",
                self.collaborators.attendance.save(record),
            )
            .await
        {
            self.undo_create(request_id, original).await;
            return Err(err);
        }

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            attendance_record_id = %request.attendance_record_id,
            overtime_rule_id = %rule.id,
            requested_until = %request.requested_until,
            "Overtime request submitted"
        );

        Ok(ack)
    }

    /// Applies a reviewer's decision to a pending request.
    ///
    /// The active overtime rule is not re-checked here.
    ///
    /// # Errors
    ///
    /// - [`EngineError::OvertimeRequestNotFound`] for an unknown id
    /// - [`EngineError::InvalidStatusTransition`] if already reviewed
    /// - [`EngineError::AttendanceRecordNotFound`] if the flag must be
    ///   restored but the record is gone
    /// - [`EngineError::Collaborator`] / [`EngineError::CollaboratorTimeout`]
    pub async fn review(
        &self,
        request_id: Uuid,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> EngineResult<ReviewAck> {
        let attendance_record_id = self.get(request_id).await?.attendance_record_id;
        let _guard = self.locks.acquire(&attendance_record_id).await;

        // Re-read under the lock: a concurrent review may have won.
        let mut request = self.get(request_id).await?;
        let pending = request.clone();
        request.apply_review(&decision, now)?;

        self.call(
            "overtime_requests.update",
            self.collaborators.requests.update(request.clone()),
        )
        .await?;

        let follow_up = match decision.status {
            ReviewStatus::Approved => {
                let exception = TimeException {
                    employee_id: request.employee_id.clone(),
                    attendance_record_id: request.attendance_record_id.clone(),
                    source_request_id: request.id,
                    exception_type: TimeExceptionType::OvertimeRequest,
                    reason: APPROVED_OVERTIME_REASON.to_string(),
                };
                self.call(
                    "exceptions.create_exception",
                    self.collaborators.exceptions.create_exception(exception),
                )
                .await
            }
            ReviewStatus::Rejected if self.config.restore_finalised_on_rejection => {
                self.restore_finalised(&request.attendance_record_id).await
            }
            ReviewStatus::Rejected => Ok(()),
        };

        if let Err(err) = follow_up {
            self.undo_review(pending).await;
            return Err(err);
        }

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            attendance_record_id = %request.attendance_record_id,
            status = %request.status,
            "Overtime request reviewed"
        );

        Ok(ReviewAck {
            updated: true,
            request,
        })
    }

    /// Returns a stored request.
    pub async fn get(&self, request_id: Uuid) -> EngineResult<OvertimeRequest> {
        self.call(
            "overtime_requests.find_by_id",
            self.collaborators.requests.find_by_id(request_id),
        )
        .await?
        .ok_or(EngineError::OvertimeRequestNotFound { id: request_id })
    }

    async fn restore_finalised(&self, attendance_record_id: &str) -> EngineResult<()> {
        let mut record = self
            .call(
                "attendance_records.find_by_id",
                self.collaborators.attendance.find_by_id(attendance_record_id),
            )
            .await?
            .ok_or_else(|| EngineError::AttendanceRecordNotFound {
                id: attendance_record_id.to_string(),
            })?;

        record.finalised_for_payroll = true;
        self.call(
            "attendance_records.save",
            self.collaborators.attendance.save(record),
        )
        .await
    }

    /// Removes a request whose payroll flag could not be cleared and writes
    /// the original record back.
    async fn undo_create(&self, request_id: Uuid, original: AttendanceRecord) {
        let attendance_record_id = original.id.clone();
        if let Err(err) = self
            .call(
                "overtime_requests.remove",
                self.collaborators.requests.remove(request_id),
            )
            .await
        {
            warn!(
                request_id = %request_id,
                error = %err,
                "Could not remove overtime request after failed submission"
            );
        }
        if let Err(err) = self
            .call(
                "attendance_records.save",
                self.collaborators.attendance.save(original),
            )
            .await
        {
            warn!(
                attendance_record_id = %attendance_record_id,
                error = %err,
                "Could not restore attendance record after failed submission"
            );
        }
    }

    /// Puts a request back to pending after its review could not complete.
    async fn undo_review(&self, pending: OvertimeRequest) {
        let request_id = pending.id;
        if let Err(err) = self
            .call(
                "overtime_requests.update",
                self.collaborators.requests.update(pending),
            )
            .await
        {
            warn!(
                request_id = %request_id,
                error = %err,
                "Could not return overtime request to pending after failed review"
            );
        }
    }

    /// Runs a collaborator call under the configured timeout.
    async fn call<T, F>(&self, operation: &'static str, fut: F) -> EngineResult<T>
    where
        F: Future<Output = EngineResult<T>>,
    {
        match tokio::time::timeout(self.config.collaborator_timeout(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(operation, error = %err, "Collaborator call failed");
                Err(err)
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.config.collaborator_timeout_ms,
                    "Collaborator call timed out"
                );
                Err(EngineError::CollaboratorTimeout {
                    operation: operation.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OvertimeRule, OvertimeStatus};
    use crate::workflow::memory::{
        InMemoryAttendanceRecordStore, InMemoryExceptionRecorder, InMemoryOvertimeRequestStore,
        InMemoryOvertimeRuleStore,
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Harness {
        workflow: Arc<OvertimeRequestWorkflow>,
        rules: Arc<InMemoryOvertimeRuleStore>,
        attendance: Arc<InMemoryAttendanceRecordStore>,
        exceptions: Arc<InMemoryExceptionRecorder>,
        requests: Arc<InMemoryOvertimeRequestStore>,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 17, 30, 0).unwrap()
    }

    fn record(id: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            finalised_for_payroll: true,
        }
    }

    fn harness_with(active_rule: bool, config: WorkflowConfig) -> Harness {
        let rules = Arc::new(InMemoryOvertimeRuleStore::new(vec![OvertimeRule {
            id: "ot_rule_1".to_string(),
            name: "Standard overtime".to_string(),
            active: active_rule,
        }]));
        let attendance = Arc::new(InMemoryAttendanceRecordStore::new(vec![
            record("att_001"),
            record("att_002"),
        ]));
        let exceptions = Arc::new(InMemoryExceptionRecorder::new());
        let requests = Arc::new(InMemoryOvertimeRequestStore::new());

        let workflow = OvertimeRequestWorkflow::new(
            WorkflowCollaborators {
                rules: rules.clone(),
                attendance: attendance.clone(),
                exceptions: exceptions.clone(),
                requests: requests.clone(),
            },
            config,
        );

        Harness {
            workflow: Arc::new(workflow),
            rules,
            attendance,
            exceptions,
            requests,
        }
    }

    fn harness() -> Harness {
        harness_with(true, WorkflowConfig::default())
    }

    fn input(record_id: &str) -> NewOvertimeRequest {
        NewOvertimeRequest {
            employee_id: "emp_001".to_string(),
            attendance_record_id: record_id.to_string(),
            requested_until: Utc.with_ymd_and_hms(2026, 2, 10, 21, 0, 0).unwrap(),
            reason: "Quarter close".to_string(),
        }
    }

    fn decision(status: ReviewStatus) -> ReviewDecision {
        ReviewDecision {
            status,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_create_without_active_rule_fails_without_side_effects() {
        let h = harness_with(false, WorkflowConfig::default());

        let err = h.workflow.create(input("att_001"), now()).await.unwrap_err();
        assert!(matches!(err, EngineError::NoActiveOvertimeRule));
        assert!(h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
        assert!(h.requests.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_clears_flag_and_stores_pending_request() {
        let h = harness();

        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        assert_eq!(ack.status, OvertimeStatus::Pending);
        assert_eq!(ack.message, PENDING_APPROVAL_MESSAGE);
        assert!(!h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
        assert!(h.attendance.get("att_002").await.unwrap().finalised_for_payroll);

        let stored = h.workflow.get(ack.request_id).await.unwrap();
        assert_eq!(stored.status, OvertimeStatus::Pending);
        assert_eq!(stored.attendance_record_id, "att_001");
        assert_eq!(stored.created_at, now());
    }

    #[tokio::test]
    async fn test_create_on_already_cleared_record_is_idempotent() {
        let h = harness();
        let mut cleared = record("att_001");
        cleared.finalised_for_payroll = false;
        h.attendance.save(cleared).await.unwrap();

        h.workflow.create(input("att_001"), now()).await.unwrap();
        assert!(!h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
    }

    #[tokio::test]
    async fn test_create_missing_attendance_record() {
        let h = harness();

        match h.workflow.create(input("att_404"), now()).await {
            Err(EngineError::AttendanceRecordNotFound { id }) => assert_eq!(id, "att_404"),
            other => panic!("Expected AttendanceRecordNotFound, got {other:?}"),
        }
        assert!(h.requests.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_blank_reason_rejected() {
        let h = harness();
        let mut blank = input("att_001");
        blank.reason = "   ".to_string();

        let err = h.workflow.create(blank, now()).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidOvertimeRequest { .. }));
        assert!(h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
    }

    #[tokio::test]
    async fn test_second_pending_request_for_record_is_rejected() {
        let h = harness();
        let first = h.workflow.create(input("att_001"), now()).await.unwrap();

        match h.workflow.create(input("att_001"), now()).await {
            Err(EngineError::DuplicateOvertimeRequest {
                existing_request_id,
                ..
            }) => assert_eq!(existing_request_id, first.request_id),
            other => panic!("Expected DuplicateOvertimeRequest, got {other:?}"),
        }

        // Another record is unaffected.
        h.workflow.create(input("att_002"), now()).await.unwrap();
        assert_eq!(h.requests.len().await, 2);
    }

    #[tokio::test]
    async fn test_new_request_allowed_after_review() {
        let h = harness();
        let first = h.workflow.create(input("att_001"), now()).await.unwrap();
        h.workflow
            .review(first.request_id, decision(ReviewStatus::Rejected), now())
            .await
            .unwrap();

        let second = h.workflow.create(input("att_001"), now()).await.unwrap();
        assert_ne!(second.request_id, first.request_id);
    }

    #[tokio::test]
    async fn test_concurrent_creates_on_one_record_admit_exactly_one() {
        let h = harness();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let workflow = h.workflow.clone();
            handles.push(tokio::spawn(async move {
                workflow.create(input("att_001"), now()).await
            }));
        }

        let mut accepted = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(EngineError::DuplicateOvertimeRequest { .. }) => duplicates += 1,
                Err(other) => panic!("Unexpected error: {other:?}"),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(duplicates, 15);
        assert_eq!(h.requests.len().await, 1);
    }

    #[tokio::test]
    async fn test_approve_records_exactly_one_exception() {
        let h = harness();
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();

        let review = h
            .workflow
            .review(
                ack.request_id,
                ReviewDecision {
                    status: ReviewStatus::Approved,
                    comment: Some("Approved by ops lead".to_string()),
                },
                now(),
            )
            .await
            .unwrap();

        assert!(review.updated);
        assert_eq!(review.request.status, OvertimeStatus::Approved);
        assert_eq!(review.request.review_comment.as_deref(), Some("Approved by ops lead"));

        let exceptions = h.exceptions.exceptions().await;
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].exception_type, TimeExceptionType::OvertimeRequest);
        assert_eq!(exceptions[0].reason, "Approved overtime");
        assert_eq!(exceptions[0].employee_id, "emp_001");
        assert_eq!(exceptions[0].attendance_record_id, "att_001");

        // Approval leaves the flag cleared.
        assert!(!h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
    }

    #[tokio::test]
    async fn test_reject_creates_no_exception_and_keeps_flag_cleared() {
        let h = harness();
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();

        let review = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Rejected), now())
            .await
            .unwrap();

        assert_eq!(review.request.status, OvertimeStatus::Rejected);
        assert!(h.exceptions.exceptions().await.is_empty());
        assert!(!h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
    }

    #[tokio::test]
    async fn test_reject_restores_flag_when_configured() {
        let h = harness_with(
            true,
            WorkflowConfig {
                restore_finalised_on_rejection: true,
                ..WorkflowConfig::default()
            },
        );
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        assert!(!h.attendance.get("att_001").await.unwrap().finalised_for_payroll);

        h.workflow
            .review(ack.request_id, decision(ReviewStatus::Rejected), now())
            .await
            .unwrap();

        assert!(h.attendance.get("att_001").await.unwrap().finalised_for_payroll);
        assert!(h.exceptions.exceptions().await.is_empty());
    }

    #[tokio::test]
    async fn test_review_twice_is_invalid_transition() {
        let h = harness();
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        h.workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap();

        let err = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatusTransition { .. }));
        assert_eq!(h.exceptions.exceptions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_review_unknown_request() {
        let h = harness();
        let id = Uuid::new_v4();

        match h.workflow.review(id, decision(ReviewStatus::Approved), now()).await {
            Err(EngineError::OvertimeRequestNotFound { id: missing }) => assert_eq!(missing, id),
            other => panic!("Expected OvertimeRequestNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_review_does_not_recheck_active_rule() {
        let h = harness();
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        assert!(h.rules.set_active("ot_rule_1", false).await);

        let review = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap();
        assert_eq!(review.request.status, OvertimeStatus::Approved);
    }

    struct SlowAttendanceStore {
        delay: Duration,
    }

    #[async_trait]
    impl AttendanceRecordStore for SlowAttendanceStore {
        async fn find_by_id(&self, id: &str) -> EngineResult<Option<AttendanceRecord>> {
            tokio::time::sleep(self.delay).await;
            Ok(Some(record(id)))
        }

        async fn save(&self, _record: AttendanceRecord) -> EngineResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_collaborator_times_out() {
        let requests = Arc::new(InMemoryOvertimeRequestStore::new());
        let workflow = OvertimeRequestWorkflow::new(
            WorkflowCollaborators {
                rules: Arc::new(InMemoryOvertimeRuleStore::new(vec![OvertimeRule {
                    id: "ot_rule_1".to_string(),
                    name: "Standard overtime".to_string(),
                    active: true,
                }])),
                attendance: Arc::new(SlowAttendanceStore {
                    delay: Duration::from_millis(500),
                }),
                exceptions: Arc::new(InMemoryExceptionRecorder::new()),
                requests: requests.clone(),
            },
            WorkflowConfig {
                collaborator_timeout_ms: 20,
                ..WorkflowConfig::default()
            },
        );

        match workflow.create(input("att_001"), now()).await {
            Err(EngineError::CollaboratorTimeout { operation }) => {
                assert_eq!(operation, "attendance_records.find_by_id");
            }
            other => panic!("Expected CollaboratorTimeout, got {other:?}"),
        }
        assert!(requests.is_empty().await);
    }

    fn unavailable(operation: &str) -> EngineError {
        EngineError::Collaborator {
            operation: operation.to_string(),
            message: "service unavailable".to_string(),
        }
    }

    /// Consumes one scheduled failure, if any remain.
    fn take_failure(remaining: &AtomicUsize) -> bool {
        remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    #[derive(Default)]
    struct FlakyRequestStore {
        inner: InMemoryOvertimeRequestStore,
        fail_insert: AtomicUsize,
        fail_update: AtomicUsize,
    }

    #[async_trait]
    impl OvertimeRequestStore for FlakyRequestStore {
        async fn insert(&self, request: OvertimeRequest) -> EngineResult<()> {
            if take_failure(&self.fail_insert) {
                return Err(unavailable("overtime_requests.insert"));
            }
            self.inner.insert(request).await
        }

        async fn update(&self, request: OvertimeRequest) -> EngineResult<()> {
            if take_failure(&self.fail_update) {
                return Err(unavailable("overtime_requests.update"));
            }
            self.inner.update(request).await
        }

        async fn remove(&self, id: Uuid) -> EngineResult<()> {
            self.inner.remove(id).await
        }

        async fn find_by_id(&self, id: Uuid) -> EngineResult<Option<OvertimeRequest>> {
            self.inner.find_by_id(id).await
        }

        async fn find_pending_for_record(
            &self,
            attendance_record_id: &str,
        ) -> EngineResult<Option<OvertimeRequest>> {
            self.inner.find_pending_for_record(attendance_record_id).await
        }
    }

    struct FlakyAttendanceStore {
        inner: InMemoryAttendanceRecordStore,
        fail_save: AtomicUsize,
    }

    #[async_trait]
    impl AttendanceRecordStore for FlakyAttendanceStore {
        async fn find_by_id(&self, id: &str) -> EngineResult<Option<AttendanceRecord>> {
            self.inner.find_by_id(id).await
        }

        async fn save(&self, record: AttendanceRecord) -> EngineResult<()> {
            if take_failure(&self.fail_save) {
                return Err(unavailable("attendance_records.save"));
            }
            self.inner.save(record).await
        }
    }

    #[derive(Default)]
    struct FlakyRecorder {
        inner: InMemoryExceptionRecorder,
        fail_create: AtomicUsize,
    }

    #[async_trait]
    impl ExceptionRecorder for FlakyRecorder {
        async fn create_exception(&self, exception: TimeException) -> EngineResult<()> {
            if take_failure(&self.fail_create) {
                return Err(unavailable("exceptions.create_exception"));
            }
            self.inner.create_exception(exception).await
        }
    }

    struct FlakyHarness {
        workflow: OvertimeRequestWorkflow,
        attendance: Arc<FlakyAttendanceStore>,
        exceptions: Arc<FlakyRecorder>,
        requests: Arc<FlakyRequestStore>,
    }

    fn flaky_harness(config: WorkflowConfig) -> FlakyHarness {
        let attendance = Arc::new(FlakyAttendanceStore {
            inner: InMemoryAttendanceRecordStore::new(vec![record("att_001")]),
            fail_save: AtomicUsize::new(0),
        });
        let exceptions = Arc::new(FlakyRecorder::default());
        let requests = Arc::new(FlakyRequestStore::default());

        let workflow = OvertimeRequestWorkflow::new(
            WorkflowCollaborators {
                rules: Arc::new(InMemoryOvertimeRuleStore::new(vec![OvertimeRule {
                    id: "ot_rule_1".to_string(),
                    name: "Standard overtime".to_string(),
                    active: true,
                }])),
                attendance: attendance.clone(),
                exceptions: exceptions.clone(),
                requests: requests.clone(),
            },
            config,
        );

        FlakyHarness {
            workflow,
            attendance,
            exceptions,
            requests,
        }
    }

    impl FlakyHarness {
        async fn flag(&self) -> bool {
            self.attendance
                .inner
                .get("att_001")
                .await
                .unwrap()
                .finalised_for_payroll
        }

        async fn exception_count(&self) -> usize {
            self.exceptions.inner.exceptions().await.len()
        }

        async fn status(&self, id: Uuid) -> OvertimeStatus {
            self.workflow.get(id).await.unwrap().status
        }
    }

    #[tokio::test]
    async fn test_failed_status_update_records_no_exception_and_retry_records_one() {
        let h = flaky_harness(WorkflowConfig::default());
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        h.requests.fail_update.store(1, Ordering::SeqCst);

        let err = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Collaborator { .. }));
        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Pending);
        assert_eq!(h.exception_count().await, 0);
        assert!(!h.flag().await);

        let review = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap();

        assert_eq!(review.request.status, OvertimeStatus::Approved);
        assert_eq!(h.exception_count().await, 1);
    }

    #[tokio::test]
    async fn test_recorder_failure_rolls_request_back_to_pending() {
        let h = flaky_harness(WorkflowConfig::default());
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        h.exceptions.fail_create.store(1, Ordering::SeqCst);

        let err = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Collaborator { .. }));
        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Pending);
        assert_eq!(h.exception_count().await, 0);

        h.workflow
            .review(ack.request_id, decision(ReviewStatus::Approved), now())
            .await
            .unwrap();

        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Approved);
        assert_eq!(h.exception_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_restore_rolls_rejection_back() {
        let h = flaky_harness(WorkflowConfig {
            restore_finalised_on_rejection: true,
            ..WorkflowConfig::default()
        });
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        h.attendance.fail_save.store(1, Ordering::SeqCst);

        let err = h
            .workflow
            .review(ack.request_id, decision(ReviewStatus::Rejected), now())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Collaborator { .. }));
        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Pending);
        assert!(!h.flag().await);

        h.workflow
            .review(ack.request_id, decision(ReviewStatus::Rejected), now())
            .await
            .unwrap();

        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Rejected);
        assert!(h.flag().await);
        assert_eq!(h.exception_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_record_finalised() {
        let h = flaky_harness(WorkflowConfig::default());
        h.requests.fail_insert.store(1, Ordering::SeqCst);

        let err = h.workflow.create(input("att_001"), now()).await.unwrap_err();

        assert!(matches!(err, EngineError::Collaborator { .. }));
        assert!(h.flag().await);
        assert!(h.requests.inner.is_empty().await);
        assert_eq!(h.exception_count().await, 0);

        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Pending);
        assert!(!h.flag().await);
    }

    #[tokio::test]
    async fn test_failed_flag_save_removes_inserted_request() {
        let h = flaky_harness(WorkflowConfig::default());
        h.attendance.fail_save.store(1, Ordering::SeqCst);

        let err = h.workflow.create(input("att_001"), now()).await.unwrap_err();

        assert!(matches!(err, EngineError::Collaborator { .. }));
        assert!(h.flag().await);
        assert!(h.requests.inner.is_empty().await);
        assert_eq!(h.exception_count().await, 0);

        // The removed request must not block a retry as a duplicate.
        let ack = h.workflow.create(input("att_001"), now()).await.unwrap();
        assert_eq!(h.status(ack.request_id).await, OvertimeStatus::Pending);
        assert_eq!(h.requests.inner.len().await, 1);
        assert!(!h.flag().await);
    }
}
