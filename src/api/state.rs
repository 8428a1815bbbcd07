//! Application state for the HR Policy Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::workflow::{OvertimeRequestWorkflow, WorkflowCollaborators};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers:
/// the loaded policy configuration and the overtime workflow.
#[derive(Clone)]
pub struct AppState {
    /// The loaded policy configuration.
    config: Arc<ConfigLoader>,
    /// The overtime workflow, wired to its collaborators.
    workflow: Arc<OvertimeRequestWorkflow>,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// The workflow is built from the collaborators and the workflow
    /// settings found in `config`.
    pub fn new(config: ConfigLoader, collaborators: WorkflowCollaborators) -> Self {
        let workflow = OvertimeRequestWorkflow::new(collaborators, config.workflow().clone());
        Self {
            config: Arc::new(config),
            workflow: Arc::new(workflow),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a reference to the overtime workflow.
    pub fn workflow(&self) -> &OvertimeRequestWorkflow {
        &self.workflow
    }
}
