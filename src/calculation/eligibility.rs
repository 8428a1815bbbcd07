//! Employee eligibility evaluation.
//!
//! This module decides whether an employee qualifies for a leave policy.
//! A policy without an eligibility block applies to everyone; otherwise every
//! configured criterion must pass.
//!
//! Tenure is measured in fixed 30-day months, not calendar months. Three
//! calendar months starting on 1 June span 92 days (3.07 tenure months) while
//! three starting on 1 February span 89 days (2.97 tenure months).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{AuditStep, EligibilityRules, Employee, LeavePolicy};

/// Number of days in one tenure month.
pub const DAYS_PER_TENURE_MONTH: i64 = 30;

const MILLIS_PER_TENURE_MONTH: i64 = DAYS_PER_TENURE_MONTH * 24 * 60 * 60 * 1000;

/// A criterion an employee can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityCriterion {
    /// `min_tenure_months` was not reached.
    MinTenure,
    /// The position is not in `positions_allowed`.
    Position,
    /// The contract type is not in `contract_types_allowed`.
    ContractType,
}

/// The result of an eligibility evaluation, including the audit step.
#[derive(Debug, Clone)]
pub struct EligibilityResult {
    /// Whether the employee qualifies.
    pub eligible: bool,
    /// Every criterion the employee failed, in evaluation order.
    pub failed_criteria: Vec<EligibilityCriterion>,
    /// The employee's tenure in 30-day months at evaluation time.
    pub tenure_months: Decimal,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

/// Returns the time between `join_date` and `now` in 30-day months.
///
/// The result is exact to the millisecond and negative for future joiners.
///
/// # Examples
///
/// ```
/// use hr_policy_engine::calculation::tenure_months;
/// use chrono::{TimeZone, Utc};
/// use rust_decimal::Decimal;
///
/// let joined = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(); // 90 days later
/// assert_eq!(tenure_months(joined, now), Decimal::from(3));
/// ```
pub fn tenure_months(join_date: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    let elapsed_ms = now.signed_duration_since(join_date).num_milliseconds();
    Decimal::from(elapsed_ms) / Decimal::from(MILLIS_PER_TENURE_MONTH)
}

fn allows(allow_list: Option<&BTreeSet<String>>, value: &str) -> bool {
    match allow_list {
        Some(set) if !set.is_empty() => set.contains(value),
        _ => true,
    }
}

fn failed_criteria(
    rules: &EligibilityRules,
    employee: &Employee,
    tenure: Decimal,
) -> Vec<EligibilityCriterion> {
    let mut failed = Vec::new();

    if let Some(min_tenure) = rules.min_tenure_months {
        if tenure < min_tenure {
            failed.push(EligibilityCriterion::MinTenure);
        }
    }
    if !allows(rules.positions_allowed.as_ref(), &employee.position) {
        failed.push(EligibilityCriterion::Position);
    }
    if !allows(rules.contract_types_allowed.as_ref(), &employee.contract_type) {
        failed.push(EligibilityCriterion::ContractType);
    }

    failed
}

/// Returns true if `employee` qualifies for `policy` at `now`.
///
/// # Examples
///
/// ```
/// use hr_policy_engine::calculation::is_eligible;
/// use hr_policy_engine::models::{AccrualMethod, Employee, LeavePolicy, RoundingRule};
/// use chrono::{TimeZone, Utc};
/// use rust_decimal::Decimal;
///
/// let policy = LeavePolicy {
///     code: "annual_leave".to_string(),
///     name: None,
///     accrual_method: AccrualMethod::Monthly,
///     monthly_rate: Decimal::ONE,
///     yearly_rate: Decimal::ZERO,
///     rounding_rule: RoundingRule::None,
///     eligibility: None,
/// };
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     join_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
///     position: "Sales".to_string(),
///     contract_type: "casual".to_string(),
/// };
/// assert!(is_eligible(&employee, &policy, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap()));
/// ```
pub fn is_eligible(employee: &Employee, policy: &LeavePolicy, now: DateTime<Utc>) -> bool {
    match &policy.eligibility {
        None => true,
        Some(rules) => {
            failed_criteria(rules, employee, tenure_months(employee.join_date, now)).is_empty()
        }
    }
}

/// Evaluates eligibility and records the decision.
///
/// All configured criteria are checked so the result lists every failure.
pub fn evaluate_eligibility(
    employee: &Employee,
    policy: &LeavePolicy,
    now: DateTime<Utc>,
    step_number: u32,
) -> EligibilityResult {
    let tenure = tenure_months(employee.join_date, now);

    let (failed, reasoning) = match &policy.eligibility {
        None => (
            Vec::new(),
            format!("Policy '{}' has no eligibility rules, all employees qualify", policy.code),
        ),
        Some(rules) => {
            let failed = failed_criteria(rules, employee, tenure);
            let reasoning = if failed.is_empty() {
                format!(
                    "Employee '{}' meets all eligibility rules of policy '{}'",
                    employee.id, policy.code
                )
            } else {
                let reasons: Vec<String> = failed
                    .iter()
                    .map(|criterion| describe_failure(*criterion, rules, employee, tenure, now))
                    .collect();
                format!(
                    "Employee '{}' is not eligible for policy '{}': {}",
                    employee.id,
                    policy.code,
                    reasons.join("; ")
                )
            };
            (failed, reasoning)
        }
    };

    let eligible = failed.is_empty();

    let audit_step = AuditStep {
        step_number,
        rule_id: "eligibility_check".to_string(),
        rule_name: "Eligibility Check".to_string(),
        policy_ref: policy.code.clone(),
        input: serde_json::json!({
            "employee_id": employee.id,
            "position": employee.position,
            "contract_type": employee.contract_type,
            "tenure_months": tenure.round_dp(2).normalize().to_string(),
            "rules": policy.eligibility
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "failed_criteria": failed
        }),
        reasoning,
    };

    EligibilityResult {
        eligible,
        failed_criteria: failed,
        tenure_months: tenure,
        audit_step,
    }
}

fn describe_failure(
    criterion: EligibilityCriterion,
    rules: &EligibilityRules,
    employee: &Employee,
    tenure: Decimal,
    now: DateTime<Utc>,
) -> String {
    match criterion {
        EligibilityCriterion::MinTenure if employee.is_future_joiner(now) => {
            "join date is in the future".to_string()
        }
        EligibilityCriterion::MinTenure => format!(
            "tenure {} months is below the minimum of {}",
            tenure.round_dp(2).normalize(),
            rules.min_tenure_months.unwrap_or_default().normalize()
        ),
        EligibilityCriterion::Position => {
            format!("position '{}' is not allowed", employee.position)
        }
        EligibilityCriterion::ContractType => {
            format!("contract type '{}' is not allowed", employee.contract_type)
        }
    }
}
