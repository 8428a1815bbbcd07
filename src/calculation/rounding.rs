//! Rounding of fractional accrual amounts.
//!
//! This module provides [`round`], the total function that normalizes a
//! decimal value according to a policy's [`RoundingRule`], and
//! [`apply_rounding`] which additionally records an audit step.
//!
//! Tie behaviour for [`RoundingRule::Round`] is fixed to "halves away from
//! zero" for both signs: `2.5 -> 3` and `-2.5 -> -3`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{AuditStep, RoundingRule};

/// Rounds `value` according to `rule`.
///
/// | Rule | Behaviour |
/// |------|-----------|
/// | `ROUND` | nearest integer, halves away from zero |
/// | `ROUND_UP` | ceiling |
/// | `ROUND_DOWN` | floor |
/// | `NONE` / unrecognized | unchanged |
///
/// # Examples
///
/// ```
/// use hr_policy_engine::calculation::round;
/// use hr_policy_engine::models::RoundingRule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
///
/// assert_eq!(round(dec("2.1"), &RoundingRule::RoundUp), dec("3"));
/// assert_eq!(round(dec("2.9"), &RoundingRule::RoundDown), dec("2"));
/// assert_eq!(round(dec("2.5"), &RoundingRule::Round), dec("3"));
/// assert_eq!(round(dec("2.5"), &RoundingRule::None), dec("2.5"));
/// ```
pub fn round(value: Decimal, rule: &RoundingRule) -> Decimal {
    match rule {
        RoundingRule::Round => {
            value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
        RoundingRule::RoundUp => value.ceil(),
        RoundingRule::RoundDown => value.floor(),
        RoundingRule::None | RoundingRule::Unrecognized(_) => value,
    }
}

/// The result of rounding an amount, including the audit step.
#[derive(Debug, Clone)]
pub struct RoundingResult {
    /// The rounded value.
    pub value: Decimal,
    /// The audit step recording this rounding.
    pub audit_step: AuditStep,
}

/// Rounds `value` and records the decision against `policy_code`.
///
/// An unrecognized rule passes the value through and logs a warning; it is
/// never an error.
pub fn apply_rounding(
    value: Decimal,
    rule: &RoundingRule,
    policy_code: &str,
    step_number: u32,
) -> RoundingResult {
    let rounded = round(value, rule);

    let reasoning = match rule {
        RoundingRule::Round => format!(
            "{} rounded to nearest whole unit (halves away from zero) = {}",
            value.normalize(),
            rounded.normalize()
        ),
        RoundingRule::RoundUp => {
            format!("{} rounded up to {}", value.normalize(), rounded.normalize())
        }
        RoundingRule::RoundDown => {
            format!("{} rounded down to {}", value.normalize(), rounded.normalize())
        }
        RoundingRule::None => format!("No rounding configured, {} kept", value.normalize()),
        RoundingRule::Unrecognized(raw) => {
            tracing::warn!(
                policy_code = %policy_code,
                rounding_rule = %raw,
                "Unrecognized rounding rule, value passed through unchanged"
            );
            format!(
                "Unrecognized rounding rule '{}', {} kept unchanged",
                raw,
                value.normalize()
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "rounding".to_string(),
        rule_name: "Rounding".to_string(),
        policy_ref: policy_code.to_string(),
        input: serde_json::json!({
            "value": value.normalize().to_string(),
            "rule": rule.as_str()
        }),
        output: serde_json::json!({
            "value": rounded.normalize().to_string()
        }),
        reasoning,
    };

    RoundingResult {
        value: rounded,
        audit_step,
    }
}
