//! Leave policy model and related types.
//!
//! This module defines the [`LeavePolicy`] struct together with the
//! [`AccrualMethod`] and [`RoundingRule`] enums that drive accrual
//! calculations, and the optional [`EligibilityRules`] block.
//!
//! Method and rule names are parsed case-insensitively. Names the engine does
//! not know are kept verbatim in an explicit `Unsupported`/`Unrecognized`
//! variant instead of failing deserialization, so a policy written for a newer
//! engine still loads.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often leave entitlement accrues under a policy.
///
/// # Example
///
/// ```
/// use hr_policy_engine::models::AccrualMethod;
///
/// assert_eq!(AccrualMethod::from("monthly".to_string()), AccrualMethod::Monthly);
/// assert_eq!(
///     AccrualMethod::from("WEEKLY".to_string()),
///     AccrualMethod::Unsupported("WEEKLY".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccrualMethod {
    /// Accrues `monthly_rate` per elapsed calendar month.
    Monthly,
    /// Accrues `yearly_rate` per elapsed calendar year.
    Yearly,
    /// A method this engine does not implement; accrues nothing.
    Unsupported(String),
}

impl AccrualMethod {
    /// Returns the canonical name of the method.
    pub fn as_str(&self) -> &str {
        match self {
            AccrualMethod::Monthly => "MONTHLY",
            AccrualMethod::Yearly => "YEARLY",
            AccrualMethod::Unsupported(raw) => raw,
        }
    }
}

impl From<String> for AccrualMethod {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" => AccrualMethod::Monthly,
            "YEARLY" => AccrualMethod::Yearly,
            _ => AccrualMethod::Unsupported(raw),
        }
    }
}

impl From<AccrualMethod> for String {
    fn from(method: AccrualMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for AccrualMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-processing applied to a fractional accrual amount.
///
/// # Example
///
/// ```
/// use hr_policy_engine::models::RoundingRule;
///
/// assert_eq!(RoundingRule::from("round_up".to_string()), RoundingRule::RoundUp);
/// assert_eq!(RoundingRule::default(), RoundingRule::None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoundingRule {
    /// Nearest integer, halves away from zero.
    Round,
    /// Ceiling.
    RoundUp,
    /// Floor.
    RoundDown,
    /// Value is left unchanged.
    #[default]
    None,
    /// A rule this engine does not know; treated like [`RoundingRule::None`].
    Unrecognized(String),
}

impl RoundingRule {
    /// Returns the canonical name of the rule.
    pub fn as_str(&self) -> &str {
        match self {
            RoundingRule::Round => "ROUND",
            RoundingRule::RoundUp => "ROUND_UP",
            RoundingRule::RoundDown => "ROUND_DOWN",
            RoundingRule::None => "NONE",
            RoundingRule::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RoundingRule {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ROUND" => RoundingRule::Round,
            "ROUND_UP" => RoundingRule::RoundUp,
            "ROUND_DOWN" => RoundingRule::RoundDown,
            "NONE" => RoundingRule::None,
            _ => RoundingRule::Unrecognized(raw),
        }
    }
}

impl From<RoundingRule> for String {
    fn from(rule: RoundingRule) -> Self {
        rule.as_str().to_string()
    }
}

impl fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criteria gating whether a policy applies to an employee.
///
/// Every configured criterion must pass. An absent or empty allow-list
/// imposes no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EligibilityRules {
    /// Minimum tenure in 30-day months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tenure_months: Option<Decimal>,
    /// Positions the policy applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions_allowed: Option<BTreeSet<String>>,
    /// Contract types the policy applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_types_allowed: Option<BTreeSet<String>>,
}

/// A configurable leave policy.
///
/// # Example
///
/// ```
/// use hr_policy_engine::models::{AccrualMethod, LeavePolicy, RoundingRule};
///
/// let yaml = r#"
/// code: annual_leave
/// accrual_method: MONTHLY
/// monthly_rate: "1.5"
/// rounding_rule: ROUND_UP
/// "#;
/// let policy: LeavePolicy = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(policy.accrual_method, AccrualMethod::Monthly);
/// assert_eq!(policy.rounding_rule, RoundingRule::RoundUp);
/// assert!(policy.eligibility.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Unique code of the policy (e.g., "annual_leave").
    pub code: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// How entitlement accrues.
    pub accrual_method: AccrualMethod,
    /// Amount credited per elapsed month.
    #[serde(default)]
    pub monthly_rate: Decimal,
    /// Amount credited per elapsed year.
    #[serde(default)]
    pub yearly_rate: Decimal,
    /// Rounding applied to the raw accrual.
    #[serde(default)]
    pub rounding_rule: RoundingRule,
    /// Eligibility criteria; `None` means everyone is eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<EligibilityRules>,
}
