//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`].

pub mod dispatcher;
pub mod list;
pub mod run;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, EXIT_NOT_FOUND};

use std::path::Path;

use crate::config::{load_config_file, WorkflowConfig};
use crate::error::{Result, StepflowError};
use crate::ui::UserInterface;

/// Load a workflow file, reporting a missing file through `ui`.
///
/// Returns `Ok(None)` when the file does not exist.
fn load_workflow(path: &Path, ui: &mut dyn UserInterface) -> Result<Option<WorkflowConfig>> {
    match load_config_file(path) {
        Ok(config) => Ok(Some(config)),
        Err(StepflowError::ConfigNotFound { path }) => {
            ui.error(&format!("Workflow file not found: {}", path.display()));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
