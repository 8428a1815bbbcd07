//! Leave accrual calculation.
//!
//! This module computes how much leave entitlement a policy credits for the
//! time elapsed since the last accrual. Elapsed time is counted in whole
//! calendar periods from the year and month numbers only (UTC); the day of
//! month is ignored, so 31 January to 1 February counts as one month and
//! 1 January to 31 January counts as none. Partial periods are never
//! pro-rated.
//!
//! "Now" is always passed in by the caller.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::models::{AccrualMethod, AuditStep, AuditWarning, LeavePolicy, RoundingRule};

use super::rounding::apply_rounding;

/// The result of an accrual calculation, including the audit trail.
#[derive(Debug, Clone)]
pub struct AccrualResult {
    /// The amount to credit, after rounding.
    pub amount: Decimal,
    /// The amount before rounding.
    pub raw_amount: Decimal,
    /// Whole periods counted (months or years, depending on the method).
    pub periods_elapsed: i64,
    /// The audit steps recording this calculation.
    pub audit_steps: Vec<AuditStep>,
    /// Configuration problems noticed along the way.
    pub warnings: Vec<AuditWarning>,
}

/// Whole calendar months between two instants, ignoring the day of month.
///
/// # Examples
///
/// ```
/// use hr_policy_engine::calculation::months_elapsed;
/// use chrono::{TimeZone, Utc};
///
/// let last = Utc.with_ymd_and_hms(2025, 11, 30, 0, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
/// assert_eq!(months_elapsed(last, now), 3);
/// ```
pub fn months_elapsed(last_accrual: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let years = i64::from(now.year()) - i64::from(last_accrual.year());
    let months = i64::from(now.month()) - i64::from(last_accrual.month());
    years * 12 + months
}

/// Whole calendar years between two instants, ignoring month and day.
pub fn years_elapsed(last_accrual: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    i64::from(now.year()) - i64::from(last_accrual.year())
}

/// Computes the leave to credit under `policy` since `last_accrual`.
///
/// Returns zero for methods the engine does not support, when
/// `last_accrual` lies in a later period than `now`, and when the amount
/// would overflow a [`Decimal`].
///
/// # Examples
///
/// ```
/// use hr_policy_engine::calculation::calculate_accrual;
/// use hr_policy_engine::models::{AccrualMethod, LeavePolicy, RoundingRule};
/// use chrono::{TimeZone, Utc};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let policy = LeavePolicy {
///     code: "annual_leave".to_string(),
///     name: None,
///     accrual_method: AccrualMethod::Monthly,
///     monthly_rate: Decimal::from_str("1.5").unwrap(),
///     yearly_rate: Decimal::ZERO,
///     rounding_rule: RoundingRule::RoundUp,
///     eligibility: None,
/// };
/// let last = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2026, 4, 15, 0, 0, 0).unwrap();
///
/// // 3 months x 1.5 = 4.5, rounded up to 5
/// assert_eq!(calculate_accrual(&policy, last, now), Decimal::from(5));
/// ```
pub fn calculate_accrual(
    policy: &LeavePolicy,
    last_accrual: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Decimal {
    calculate_accrual_detailed(policy, last_accrual, now, 1).amount
}

/// Computes the accrual and records each decision, starting at `step_number`.
pub fn calculate_accrual_detailed(
    policy: &LeavePolicy,
    last_accrual: DateTime<Utc>,
    now: DateTime<Utc>,
    step_number: u32,
) -> AccrualResult {
    let (counted, rate, unit, rule_id, rule_name) = match &policy.accrual_method {
        AccrualMethod::Monthly => (
            months_elapsed(last_accrual, now),
            policy.monthly_rate,
            "month",
            "monthly_accrual",
            "Monthly Accrual",
        ),
        AccrualMethod::Yearly => (
            years_elapsed(last_accrual, now),
            policy.yearly_rate,
            "year",
            "yearly_accrual",
            "Yearly Accrual",
        ),
        AccrualMethod::Unsupported(raw) => {
            return unsupported_method(policy, raw, last_accrual, now, step_number);
        }
    };

    let mut warnings = Vec::new();

    let periods_elapsed = if counted < 0 {
        tracing::warn!(
            policy_code = %policy.code,
            last_accrual = %last_accrual,
            now = %now,
            periods = counted,
            "Last accrual is after the evaluation time, no accrual credited"
        );
        warnings.push(AuditWarning::new(
            "NEGATIVE_ELAPSED_PERIOD",
            format!(
                "Last accrual {} is {} {}(s) after {}; treated as zero elapsed periods",
                last_accrual,
                -counted,
                unit,
                now
            ),
            "medium",
        ));
        0
    } else {
        counted
    };

    let raw_amount = match Decimal::from(periods_elapsed).checked_mul(rate) {
        Some(amount) => amount,
        None => {
            tracing::warn!(
                policy_code = %policy.code,
                periods = periods_elapsed,
                rate = %rate,
                "Accrual amount overflowed, no accrual credited"
            );
            warnings.push(AuditWarning::new(
                "ACCRUAL_OVERFLOW",
                format!(
                    "{} {}(s) x {} per {} exceeds the representable range; treated as zero",
                    periods_elapsed, unit, rate, unit
                ),
                "high",
            ));
            Decimal::ZERO
        }
    };

    let period_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        policy_ref: policy.code.clone(),
        input: serde_json::json!({
            "accrual_method": policy.accrual_method.as_str(),
            "last_accrual": last_accrual.to_rfc3339(),
            "now": now.to_rfc3339(),
            "rate": rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "periods_elapsed": periods_elapsed,
            "raw_amount": raw_amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} {}(s) elapsed x {} per {} = {}",
            periods_elapsed,
            unit,
            rate.normalize(),
            unit,
            raw_amount.normalize()
        ),
    };

    if let RoundingRule::Unrecognized(raw) = &policy.rounding_rule {
        warnings.push(AuditWarning::new(
            "UNRECOGNIZED_ROUNDING_RULE",
            format!("Rounding rule '{}' is not recognized; amount left unrounded", raw),
            "low",
        ));
    }

    let rounding = apply_rounding(raw_amount, &policy.rounding_rule, &policy.code, step_number + 1);

    AccrualResult {
        amount: rounding.value,
        raw_amount,
        periods_elapsed,
        audit_steps: vec![period_step, rounding.audit_step],
        warnings,
    }
}

fn unsupported_method(
    policy: &LeavePolicy,
    raw: &str,
    last_accrual: DateTime<Utc>,
    now: DateTime<Utc>,
    step_number: u32,
) -> AccrualResult {
    tracing::warn!(
        policy_code = %policy.code,
        accrual_method = %raw,
        "Unsupported accrual method, no accrual credited"
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "unsupported_accrual_method".to_string(),
        rule_name: "Unsupported Accrual Method".to_string(),
        policy_ref: policy.code.clone(),
        input: serde_json::json!({
            "accrual_method": raw,
            "last_accrual": last_accrual.to_rfc3339(),
            "now": now.to_rfc3339()
        }),
        output: serde_json::json!({
            "amount": "0"
        }),
        reasoning: format!("Accrual method '{}' is not supported, crediting 0", raw),
    };

    AccrualResult {
        amount: Decimal::ZERO,
        raw_amount: Decimal::ZERO,
        periods_elapsed: 0,
        audit_steps: vec![audit_step],
        warnings: vec![AuditWarning::new(
            "UNSUPPORTED_ACCRUAL_METHOD",
            format!(
                "Policy '{}' uses unsupported accrual method '{}'; nothing was credited",
                policy.code, raw
            ),
            "high",
        )],
    }
}
