//! Workflow file loading and engine construction.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::schema::{StepConfig, WorkflowConfig};
use crate::config::validator::validate;
use crate::error::{Result, StepflowError};
use crate::runner::Engine;
use crate::steps::{CommandAction, Step};

/// Load a workflow file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<WorkflowConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StepflowError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StepflowError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse an in-memory workflow.
pub fn load_config_str(content: &str) -> Result<WorkflowConfig> {
    parse_config(content, Path::new("<string>"))
}

/// Parse YAML content into a [`WorkflowConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<WorkflowConfig> {
    serde_yaml::from_str(content).map_err(|e| StepflowError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Build an engine from a workflow, registering one command step per
/// entry in file order.
///
/// # Errors
///
/// Returns `ConfigValidationError` listing every error-level issue if the
/// workflow does not validate.
pub fn build_engine(config: &WorkflowConfig) -> Result<Engine> {
    let errors: Vec<String> = validate(config)
        .into_iter()
        .filter(|issue| issue.is_error())
        .map(|issue| issue.message)
        .collect();
    if !errors.is_empty() {
        return Err(StepflowError::ConfigValidationError {
            message: errors.join("; "),
        });
    }

    let engine = Engine::new(config.name.clone(), config.settings.output_dir.clone())
        .with_continue_on_error(config.settings.continue_on_error)
        .with_step_directories(config.settings.create_step_directories);

    for step in &config.steps {
        engine.add_step(build_step(step))?;
    }

    tracing::debug!(
        "Built workflow '{}' with {} steps",
        config.name,
        engine.len()
    );

    Ok(engine)
}

fn build_step(config: &StepConfig) -> Step {
    let action = CommandAction::new(&config.id, &config.command).with_env(config.env.clone());

    let mut builder = Step::builder(&config.id, action)
        .name(config.display_name())
        .description(config.description.clone().unwrap_or_default())
        .enabled(config.enabled)
        .continue_on_error(config.continue_on_error)
        .dependencies(config.depends_on.iter().cloned());

    if let Some(secs) = config.timeout.filter(|t| *t > 0.0) {
        match Duration::try_from_secs_f64(secs) {
            Ok(timeout) => builder = builder.timeout(timeout),
            Err(_) => tracing::warn!(step = %config.id, "Ignoring out-of-range timeout {}", secs),
        }
    }

    builder.build()
}
