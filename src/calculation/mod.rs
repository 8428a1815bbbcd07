//! Calculation logic for the HR Policy Engine.
//!
//! This module contains the pure policy functions: rounding of fractional
//! amounts, employee eligibility evaluation and leave accrual calculation.
//! None of them read the clock; callers pass the evaluation time in.

mod accrual;
mod eligibility;
mod rounding;

pub use accrual::{
    AccrualResult, calculate_accrual, calculate_accrual_detailed, months_elapsed, years_elapsed,
};
pub use eligibility::{
    DAYS_PER_TENURE_MONTH, EligibilityCriterion, EligibilityResult, evaluate_eligibility,
    is_eligible, tenure_months,
};
pub use rounding::{RoundingResult, apply_rounding, round};
