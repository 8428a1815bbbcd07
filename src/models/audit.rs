//! Audit trail models.
//!
//! Every policy decision records an [`AuditStep`] capturing its input,
//! output and reasoning, so HR staff can see why an employee was credited a
//! given amount or judged ineligible.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a policy decision.
///
/// # Example
///
/// ```
/// use hr_policy_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "rounding".to_string(),
///     rule_name: "Rounding".to_string(),
///     policy_ref: "annual_leave".to_string(),
///     input: serde_json::json!({"value": "4.5", "rule": "ROUND_UP"}),
///     output: serde_json::json!({"value": "5"}),
///     reasoning: "4.5 rounded up to 5".to_string(),
/// };
/// assert_eq!(step.rule_id, "rounding");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Code of the leave policy the rule belongs to.
    pub policy_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during evaluation.
///
/// Warnings flag configuration problems that do not change the numeric
/// result but deserve attention, such as an accrual method the engine does
/// not support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of evaluation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during evaluation.
    pub warnings: Vec<AuditWarning>,
    /// The total evaluation duration in microseconds.
    pub duration_us: u64,
}
