//! List command implementation.
//!
//! The `stepflow list` command prints the steps of a workflow file in run
//! order.

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::theme::StepflowTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_NOT_FOUND};
use super::load_workflow;

/// The list command implementation.
pub struct ListCommand {
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(args: ListArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_workflow(&self.args.file, ui)? else {
            return Ok(CommandResult::failure(EXIT_NOT_FOUND));
        };

        let theme = if ui.is_interactive() {
            StepflowTheme::detect()
        } else {
            StepflowTheme::plain()
        };
        ui.show_header(&config.name);

        if config.steps.is_empty() {
            ui.message("No steps defined.");
            return Ok(CommandResult::success());
        }

        for (position, step) in config.steps.iter().enumerate() {
            let mut line = format!(
                "{:>3}. {}",
                position + 1,
                theme.highlight.apply_to(&step.id)
            );
            if step.display_name() != step.id {
                line.push_str(&format!(" ({})", step.display_name()));
            }
            if !step.depends_on.is_empty() {
                line.push_str(&format!(
                    " {}",
                    theme
                        .dim
                        .apply_to(format!("← {}", step.depends_on.join(", ")))
                ));
            }
            if !step.enabled {
                line.push_str(&format!(" {}", theme.warning.apply_to("[disabled]")));
            }
            ui.message(&line);

            if let Some(description) = step.description.as_deref().filter(|d| !d.is_empty()) {
                ui.message(&format!("       {}", theme.dim.apply_to(description)));
            }
        }

        Ok(CommandResult::success())
    }
}
