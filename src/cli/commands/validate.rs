//! Validate command implementation.
//!
//! The `stepflow validate` command checks a workflow file without running
//! it.

use crate::cli::args::ValidateArgs;
use crate::config::{validate, Severity};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_NOT_FOUND};
use super::load_workflow;

/// The validate command implementation.
pub struct ValidateCommand {
    args: ValidateArgs,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(args: ValidateArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ValidateArgs {
        &self.args
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_workflow(&self.args.file, ui)? else {
            return Ok(CommandResult::failure(EXIT_NOT_FOUND));
        };

        let issues = validate(&config);
        let error_count = issues.iter().filter(|i| i.is_error()).count();
        let warning_count = issues.len() - error_count;

        for issue in &issues {
            match issue.severity {
                Severity::Error => ui.error(&issue.to_string()),
                Severity::Warning => ui.warning(&issue.to_string()),
            }
        }

        if error_count > 0 {
            ui.message(&format!(
                "{} error(s), {} warning(s)",
                error_count, warning_count
            ));
            return Ok(CommandResult::failure(1));
        }

        ui.success(&format!(
            "{} is valid ({} steps, {} warning(s))",
            self.args.file.display(),
            config.steps.len(),
            warning_count
        ));
        Ok(CommandResult::success())
    }
}
