//! Workflow file schema.
//!
//! These structs map to the YAML workflow file format.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root structure of a workflow file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Workflow name (for display and logging)
    pub name: String,

    /// Engine settings
    pub settings: SettingsConfig,

    /// Steps in run order
    pub steps: Vec<StepConfig>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            name: "workflow".to_string(),
            settings: SettingsConfig::default(),
            steps: Vec::new(),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Base directory for run directories
    pub output_dir: PathBuf,

    /// Keep running after any failed step
    pub continue_on_error: bool,

    /// Create a directory for each executed step
    pub create_step_directories: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("runs"),
            continue_on_error: false,
            create_step_directories: true,
        }
    }
}

/// A single shell-command step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Unique step id
    pub id: String,

    /// Display name (defaults to the id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description shown by `stepflow list`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Shell command to run
    pub command: String,

    /// Whether the step takes part in runs
    pub enabled: bool,

    /// Keep running later steps if this one fails
    pub continue_on_error: bool,

    /// Advisory timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    /// Steps that must succeed earlier in the same run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Extra environment variables for the command
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            description: None,
            command: String::new(),
            enabled: true,
            continue_on_error: false,
            timeout: None,
            depends_on: Vec::new(),
            env: HashMap::new(),
        }
    }
}

impl StepConfig {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
