//! Configuration types for the policy engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::LeavePolicy;

fn default_collaborator_timeout_ms() -> u64 {
    5_000
}

/// Settings for the overtime request workflow, loaded from `workflow.yaml`.
///
/// Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Set `finalised_for_payroll` back to true when a request is rejected.
    ///
    /// Off by default: the flag cleared at submission stays cleared until
    /// another process corrects the period.
    #[serde(default)]
    pub restore_finalised_on_rejection: bool,
    /// Upper bound for each collaborator call, in milliseconds.
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
}

impl WorkflowConfig {
    /// Returns the collaborator timeout as a [`Duration`].
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            restore_finalised_on_rejection: false,
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
        }
    }
}

/// The complete engine configuration.
///
/// Aggregates the workflow settings and every leave policy, keyed by code.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Workflow settings.
    workflow: WorkflowConfig,
    /// Leave policies by code.
    policies: HashMap<String, LeavePolicy>,
}

impl EngineConfig {
    /// Creates a configuration from its parts.
    ///
    /// Returns [`EngineError::ConfigParseError`] if two policies share a code.
    pub fn new(workflow: WorkflowConfig, policies: Vec<LeavePolicy>) -> EngineResult<Self> {
        let mut by_code = HashMap::with_capacity(policies.len());
        for policy in policies {
            let code = policy.code.clone();
            if by_code.insert(code.clone(), policy).is_some() {
                return Err(EngineError::ConfigParseError {
                    path: "policies".to_string(),
                    message: format!("duplicate policy code '{}'", code),
                });
            }
        }

        Ok(Self {
            workflow,
            policies: by_code,
        })
    }

    /// Returns the workflow settings.
    pub fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    /// Returns all policies keyed by code.
    pub fn policies(&self) -> &HashMap<String, LeavePolicy> {
        &self.policies
    }
}
