//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the policy
//! engine configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::LeavePolicy;

use super::types::{EngineConfig, WorkflowConfig};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── workflow.yaml        # Overtime workflow settings
/// └── policies/
///     ├── annual_leave.yaml
///     └── sick_leave.yaml  # One leave policy per file
/// ```
///
/// # Example
///
/// ```no_run
/// use hr_policy_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let policy = loader.get_policy("annual_leave").unwrap();
/// println!("Accrual method: {}", policy.accrual_method);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if:
    /// - `workflow.yaml` or the `policies` directory is missing
    /// - the `policies` directory holds no `.yaml` files
    /// - any file contains invalid YAML or misses a required field
    /// - two policy files declare the same code
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let workflow = Self::load_yaml::<WorkflowConfig>(&path.join("workflow.yaml"))?;
        let policies = Self::load_policies(&path.join("policies"))?;

        tracing::debug!(
            path = %path.display(),
            policies = policies.len(),
            "Loaded policy engine configuration"
        );

        Ok(Self {
            config: EngineConfig::new(workflow, policies)?,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all policy files from the policies directory, ordered by file name.
    fn load_policies(policies_dir: &Path) -> EngineResult<Vec<LeavePolicy>> {
        let policies_dir_str = policies_dir.display().to_string();

        let entries = fs::read_dir(policies_dir).map_err(|_| EngineError::ConfigNotFound {
            path: policies_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: policies_dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no policy files found)", policies_dir_str),
            });
        }

        paths
            .iter()
            .map(|path| Self::load_yaml::<LeavePolicy>(path))
            .collect()
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the workflow settings.
    pub fn workflow(&self) -> &WorkflowConfig {
        self.config.workflow()
    }

    /// Gets a leave policy by its code.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hr_policy_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// let policy = loader.get_policy("annual_leave")?;
    /// println!("Monthly rate: {}", policy.monthly_rate);
    /// # Ok::<(), hr_policy_engine::error::EngineError>(())
    /// ```
    pub fn get_policy(&self, code: &str) -> EngineResult<&LeavePolicy> {
        self.config
            .policies()
            .get(code)
            .ok_or_else(|| EngineError::PolicyNotFound {
                code: code.to_string(),
            })
    }
}
