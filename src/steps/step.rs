//! Step definitions.
//!
//! A [`Step`] pairs static configuration (identity, dependencies, failure
//! policy) with the runtime state the engine updates during a run. The
//! work itself is any [`StepAction`]; plain closures qualify.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::runner::RunContext;

use super::result::StepResult;
use super::status::StepStatus;

/// The work performed by a step.
///
/// Returning `Err` (or panicking) is not fatal to the run: the engine
/// converts it into a failed [`StepResult`].
pub trait StepAction: Send + Sync {
    /// Execute the step against the shared run context.
    fn execute(&self, context: &mut RunContext) -> anyhow::Result<StepResult>;
}

impl<F> StepAction for F
where
    F: Fn(&mut RunContext) -> anyhow::Result<StepResult> + Send + Sync,
{
    fn execute(&self, context: &mut RunContext) -> anyhow::Result<StepResult> {
        self(context)
    }
}

/// A named, individually enable-able unit of work.
///
/// Cloning a step is cheap; the action is shared. Steps handed out by the
/// engine (via getters or callbacks) are snapshots, so mutating them does
/// not affect the registered step.
#[derive(Clone)]
pub struct Step {
    /// Unique id within an engine.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Display-only description.
    pub description: String,

    /// Whether the step takes part in runs.
    pub enabled: bool,

    /// Keep running later steps if this one fails.
    pub continue_on_error: bool,

    /// Declared time budget. Advisory: overruns are logged, never enforced.
    pub timeout: Option<Duration>,

    /// Ids of steps that must have succeeded earlier in the same run.
    pub dependencies: Vec<String>,

    /// Current status.
    pub status: StepStatus,

    /// Result of the last run, if the step was reached.
    pub result: Option<StepResult>,

    /// When the step last started executing.
    pub started_at: Option<DateTime<Local>>,

    /// When the step last finished executing.
    pub completed_at: Option<DateTime<Local>>,

    action: Arc<dyn StepAction>,
}

impl Step {
    /// Create an enabled step with no dependencies.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        action: impl StepAction + 'static,
    ) -> Self {
        Self::builder(id, action).name(name).build()
    }

    /// Create a step from a closure, using the id as its name.
    pub fn from_fn<F>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut RunContext) -> anyhow::Result<StepResult> + Send + Sync + 'static,
    {
        Self::builder(id, f).build()
    }

    /// Start building a step.
    pub fn builder(id: impl Into<String>, action: impl StepAction + 'static) -> StepBuilder {
        StepBuilder::new(id, Arc::new(action))
    }

    /// The step's action.
    pub fn action(&self) -> Arc<dyn StepAction> {
        Arc::clone(&self.action)
    }

    /// Restore the initial runtime state.
    pub fn reset(&mut self) {
        self.status = StepStatus::initial(self.enabled);
        self.result = None;
        self.started_at = None;
        self.completed_at = None;
    }

    /// Set the enabled flag and the matching idle status.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.status = StepStatus::initial(enabled);
    }

    /// Whether the step has the given id among its dependencies.
    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("continue_on_error", &self.continue_on_error)
            .field("timeout", &self.timeout)
            .field("dependencies", &self.dependencies)
            .field("status", &self.status)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Step`].
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    fn new(id: impl Into<String>, action: Arc<dyn StepAction>) -> Self {
        let id = id.into();
        Self {
            step: Step {
                name: id.clone(),
                id,
                description: String::new(),
                enabled: true,
                continue_on_error: false,
                timeout: None,
                dependencies: Vec::new(),
                status: StepStatus::Pending,
                result: None,
                started_at: None,
                completed_at: None,
                action,
            },
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.step.name = name.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.step.description = description.into();
        self
    }

    /// Enable or disable the step.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.step.enabled = enabled;
        self
    }

    /// Keep running later steps if this one fails.
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.step.continue_on_error = continue_on_error;
        self
    }

    /// Declare an advisory timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.step.timeout = Some(timeout);
        self
    }

    /// Add a dependency. Repeated ids are ignored.
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.step.depends_on(&id) {
            self.step.dependencies.push(id);
        }
        self
    }

    /// Add several dependencies in order.
    pub fn dependencies<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().fold(self, |b, id| b.depends_on(id))
    }

    /// Finish the step.
    pub fn build(mut self) -> Step {
        self.step.reset();
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut RunContext) -> anyhow::Result<StepResult> {
        Ok(StepResult::success("ok"))
    }

    #[test]
    fn builder_defaults() {
        let step = Step::builder("fetch", noop).build();
        assert_eq!(step.id, "fetch");
        assert_eq!(step.name, "fetch");
        assert!(step.description.is_empty());
        assert!(step.enabled);
        assert!(!step.continue_on_error);
        assert!(step.timeout.is_none());
        assert!(step.dependencies.is_empty());
        assert_eq!(step.status, StepStatus::Pending);
        assert!(step.result.is_none());
    }

    #[test]
    fn disabled_step_starts_disabled() {
        let step = Step::builder("build", noop).enabled(false).build();
        assert_eq!(step.status, StepStatus::Disabled);
    }

    #[test]
    fn dependencies_are_deduplicated_in_order() {
        let step = Step::builder("report", noop)
            .dependencies(["parse", "fetch", "parse"])
            .build();
        assert_eq!(step.dependencies, vec!["parse", "fetch"]);
        assert!(step.depends_on("fetch"));
        assert!(!step.depends_on("report"));
    }

    #[test]
    fn reset_clears_runtime_state() {
        let mut step = Step::new("fetch", "Fetch", noop);
        step.status = StepStatus::Completed;
        step.result = Some(StepResult::success("done"));
        step.started_at = Some(Local::now());
        step.completed_at = Some(Local::now());

        step.reset();

        assert_eq!(step.status, StepStatus::Pending);
        assert!(step.result.is_none());
        assert!(step.started_at.is_none());
        assert!(step.completed_at.is_none());
    }

    #[test]
    fn set_enabled_toggles_status() {
        let mut step = Step::new("fetch", "Fetch", noop);
        step.set_enabled(false);
        assert_eq!(step.status, StepStatus::Disabled);
        step.set_enabled(true);
        assert_eq!(step.status, StepStatus::Pending);
    }

    #[test]
    fn closure_actions_execute() {
        let step = Step::from_fn("write", |ctx: &mut RunContext| {
            ctx.insert("written", true);
            Ok(StepResult::success("wrote"))
        });
        let mut ctx = RunContext::new();
        let result = step.action().execute(&mut ctx).unwrap();
        assert!(result.success);
        assert_eq!(ctx.get_bool("written"), Some(true));
    }
}
