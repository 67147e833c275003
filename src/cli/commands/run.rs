//! Run command implementation.
//!
//! The `stepflow run` command builds an engine from a workflow file and
//! runs it, streaming engine log lines while the run proceeds on a
//! background thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::cli::args::RunArgs;
use crate::config::{build_engine, WorkflowConfig};
use crate::error::{Result, StepflowError};
use crate::runner::{Engine, RunContext, RunResults};
use crate::steps::{RunSummary, StepStatus};
use crate::ui::{OutputMode, UserInterface};

use super::dispatcher::{Command, CommandResult, EXIT_NOT_FOUND};
use super::load_workflow;

const LOG_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

/// JSON report printed by `--json`.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    workflow: &'a str,
    run_directory: Option<PathBuf>,
    success: bool,
    steps: Vec<StepReport<'a>>,
}

#[derive(Debug, Serialize)]
struct StepReport<'a> {
    id: &'a str,
    success: bool,
    message: &'a str,
    duration_secs: f64,
    status: Option<StepStatus>,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Apply command-line overrides to the loaded workflow.
    fn apply_overrides(&self, config: &mut WorkflowConfig) {
        config.settings.output_dir = match &self.args.output_dir {
            Some(dir) => dir.clone(),
            None => resolve_output_dir(&self.args.file, &config.settings.output_dir),
        };
        if self.args.continue_on_error {
            config.settings.continue_on_error = true;
        }
        if self.args.no_step_dirs {
            config.settings.create_step_directories = false;
        }
    }

    fn disable_steps(&self, engine: &Engine) -> Result<()> {
        for id in &self.args.disable {
            if !engine.enable_step(id, false) {
                return Err(StepflowError::UnknownStep { id: id.clone() });
            }
        }
        Ok(())
    }

    /// Run the engine on a background thread, forwarding log lines to `ui`.
    fn run_engine(&self, engine: Arc<Engine>, ui: &mut dyn UserInterface) -> Result<RunResults> {
        let total = engine.steps().iter().filter(|s| s.enabled).count();
        let bar = ui.start_progress(total);

        let start_bar = bar.clone();
        engine.on_step_start(move |step| start_bar.set_step(&step.name));
        let progress_bar = bar.clone();
        engine.on_progress(move |done, total| progress_bar.set_progress(done, total));

        let handle = engine.run_in_background(RunContext::new());
        while !handle.is_finished() {
            for line in engine.drain_logs() {
                ui.log_line(&line);
            }
            thread::sleep(LOG_POLL_INTERVAL);
        }
        let outcome = handle.join();

        for line in engine.drain_logs() {
            ui.log_line(&line);
        }
        ui.finish_progress();
        engine.clear_callbacks();

        outcome.map_err(|_| anyhow::anyhow!("workflow thread panicked"))?
    }

    fn report_json(&self, engine: &Engine, results: &RunResults, ui: &mut dyn UserInterface) {
        let steps = results
            .iter()
            .map(|(id, result)| StepReport {
                id,
                success: result.success,
                message: &result.message,
                duration_secs: result.duration_secs(),
                status: engine.get_step(id).map(|s| s.status),
            })
            .collect();
        let report = RunReport {
            workflow: engine.name(),
            run_directory: engine.run_directory(),
            success: RunSummary::from_results(results).all_succeeded(),
            steps,
        };

        match serde_json::to_string_pretty(&report) {
            Ok(json) => ui.output(&json),
            Err(e) => ui.error(&format!("Failed to serialize report: {}", e)),
        }
    }

    fn report_summary(&self, engine: &Engine, results: &RunResults, ui: &mut dyn UserInterface) {
        let summary = RunSummary::from_results(results);

        ui.message("");
        for (id, result) in results {
            ui.message(&format!("  {}", result.summary_line(id)));
        }
        if let Some(dir) = engine.run_directory() {
            ui.message(&format!("Run directory: {}", dir.display()));
        }

        let line = format!("{}/{} steps successful", summary.succeeded, summary.total);
        if summary.all_succeeded() {
            ui.success(&line);
        } else {
            ui.warning(&line);
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(mut config) = load_workflow(&self.args.file, ui)? else {
            return Ok(CommandResult::failure(EXIT_NOT_FOUND));
        };

        if self.args.json {
            ui.set_output_mode(OutputMode::Silent);
        } else if self.args.quiet {
            ui.set_output_mode(OutputMode::Quiet);
        }

        self.apply_overrides(&mut config);
        let engine = build_engine(&config)?;
        self.disable_steps(&engine)?;

        tracing::debug!(
            "Running '{}' into {}",
            config.name,
            config.settings.output_dir.display()
        );

        ui.show_header(engine.name());
        let engine = Arc::new(engine);
        let results = self.run_engine(Arc::clone(&engine), ui)?;

        if self.args.json {
            self.report_json(&engine, &results, ui);
        } else {
            self.report_summary(&engine, &results, ui);
        }

        if RunSummary::from_results(&results).all_succeeded() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

/// Resolve a relative output directory against the workflow file's directory.
fn resolve_output_dir(file: &Path, output_dir: &Path) -> PathBuf {
    if output_dir.is_absolute() {
        return output_dir.to_path_buf();
    }
    match file.parent() {
        Some(parent) => parent.join(output_dir),
        None => output_dir.to_path_buf(),
    }
}
