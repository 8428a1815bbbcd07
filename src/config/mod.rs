//! Configuration loading and management for the HR Policy Engine.
//!
//! This module provides functionality to load leave policies and overtime
//! workflow settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use hr_policy_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded {} policies", config.config().policies().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, WorkflowConfig};
