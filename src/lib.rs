//! HR Policy Engine
//!
//! This crate evaluates leave policies (employee eligibility and periodic
//! accrual with configurable rounding) and drives the overtime request
//! workflow that blocks payroll finalisation until a reviewer decides.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod workflow;
