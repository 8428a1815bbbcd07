//! Employee model.
//!
//! This module defines the Employee struct evaluated against leave policy
//! eligibility rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an employee evaluated by the policy engine.
///
/// Position and contract type are free-form identifiers matched exactly
/// against a policy's allow-lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// When the employee joined.
    pub join_date: DateTime<Utc>,
    /// The employee's position (e.g., "Engineer").
    pub position: String,
    /// The employee's contract type (e.g., "permanent").
    pub contract_type: String,
}

impl Employee {
    /// Returns true if the employee joined after `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hr_policy_engine::models::Employee;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     join_date: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
    ///     position: "Engineer".to_string(),
    ///     contract_type: "permanent".to_string(),
    /// };
    /// let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    /// assert!(employee.is_future_joiner(now));
    /// ```
    pub fn is_future_joiner(&self, now: DateTime<Utc>) -> bool {
        self.join_date > now
    }
}
