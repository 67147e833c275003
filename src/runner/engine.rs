//! Workflow execution engine.
//!
//! The [`Engine`] owns an ordered registry of [`Step`]s and runs them
//! strictly one after another. Before each step it checks the stop flag,
//! the step's enabled flag, and its dependencies; then it invokes the
//! step's action with the shared [`RunContext`], records the result, and
//! decides whether to carry on.
//!
//! An engine is long-lived and drives many runs, one at a time. It is
//! `Sync`: share it through an `Arc` to stop a run or inspect step state
//! from another thread while a run is in progress.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use indexmap::IndexMap;

use crate::error::{Result, StepflowError};
use crate::steps::{RunSummary, Step, StepResult, StepStatus};

use super::context::RunContext;
use super::layout;
use super::log::{LogLevel, LogLine, LogQueue};

/// Results of one run, keyed by step id in the order they were recorded.
///
/// Steps the run never reached (because it stopped early) are absent.
pub type RunResults = IndexMap<String, StepResult>;

type StepCallback = Arc<dyn Fn(&Step) + Send + Sync>;
type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;
type LogCallback = Arc<dyn Fn(&str, LogLevel) + Send + Sync>;

#[derive(Clone, Default)]
struct Callbacks {
    on_step_start: Option<StepCallback>,
    on_step_complete: Option<StepCallback>,
    on_progress: Option<ProgressCallback>,
    on_log: Option<LogCallback>,
}

#[derive(Default)]
struct Registry {
    steps: HashMap<String, Step>,
    order: Vec<String>,
}

/// Orchestrates sequential execution of registered steps.
pub struct Engine {
    name: String,
    output_dir: PathBuf,
    continue_on_error: AtomicBool,
    create_step_directories: AtomicBool,
    registry: Mutex<Registry>,
    running: AtomicBool,
    stop_requested: AtomicBool,
    current_step: Mutex<Option<String>>,
    run_directory: Mutex<Option<PathBuf>>,
    callbacks: Mutex<Callbacks>,
    logs: LogQueue,
}

/// Clears the running state when a run ends, however it ends.
struct RunGuard<'a> {
    engine: &'a Engine,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *lock(&self.engine.current_step) = None;
        self.engine.running.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Engine {
    /// Create an engine writing run directories under `output_dir`.
    ///
    /// Step directories are enabled and the workflow-level
    /// continue-on-error policy is off.
    pub fn new(name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            output_dir: output_dir.into(),
            continue_on_error: AtomicBool::new(false),
            create_step_directories: AtomicBool::new(true),
            registry: Mutex::new(Registry::default()),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            current_step: Mutex::new(None),
            run_directory: Mutex::new(None),
            callbacks: Mutex::new(Callbacks::default()),
            logs: LogQueue::new(),
        }
    }

    /// Set the workflow-level continue-on-error policy.
    pub fn with_continue_on_error(self, continue_on_error: bool) -> Self {
        self.set_continue_on_error(continue_on_error);
        self
    }

    /// Enable or disable per-step directories.
    pub fn with_step_directories(self, enabled: bool) -> Self {
        self.set_create_step_directories(enabled);
        self
    }

    /// Workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base directory for run directories.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether a failed step lets the run continue regardless of its own policy.
    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error.load(Ordering::Acquire)
    }

    /// Set the workflow-level continue-on-error policy.
    pub fn set_continue_on_error(&self, continue_on_error: bool) {
        self.continue_on_error
            .store(continue_on_error, Ordering::Release);
    }

    /// Whether a directory is created for each executed step.
    pub fn create_step_directories(&self) -> bool {
        self.create_step_directories.load(Ordering::Acquire)
    }

    /// Enable or disable per-step directories.
    pub fn set_create_step_directories(&self, enabled: bool) {
        self.create_step_directories
            .store(enabled, Ordering::Release);
    }

    // --- registry -------------------------------------------------------

    /// Register a step at the end of the run order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStep` if a step with the same id is registered.
    pub fn add_step(&self, step: Step) -> Result<()> {
        let mut registry = lock(&self.registry);
        if registry.steps.contains_key(&step.id) {
            return Err(StepflowError::DuplicateStep { id: step.id });
        }
        registry.order.push(step.id.clone());
        registry.steps.insert(step.id.clone(), step);
        Ok(())
    }

    /// Remove a step, returning it if it was registered.
    pub fn remove_step(&self, id: &str) -> Option<Step> {
        let mut registry = lock(&self.registry);
        let step = registry.steps.remove(id)?;
        registry.order.retain(|s| s != id);
        Some(step)
    }

    /// Replace the run order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrder` unless `new_order` is a permutation of the
    /// registered ids.
    pub fn reorder_steps<S: AsRef<str>>(&self, new_order: &[S]) -> Result<()> {
        let mut registry = lock(&self.registry);

        if new_order.len() != registry.order.len() {
            return Err(StepflowError::InvalidOrder {
                message: format!(
                    "expected {} step ids, got {}",
                    registry.order.len(),
                    new_order.len()
                ),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for id in new_order.iter().map(AsRef::as_ref) {
            if !registry.steps.contains_key(id) {
                return Err(StepflowError::InvalidOrder {
                    message: format!("unknown step '{}'", id),
                });
            }
            if !seen.insert(id) {
                return Err(StepflowError::InvalidOrder {
                    message: format!("step '{}' listed twice", id),
                });
            }
        }

        registry.order = new_order.iter().map(|s| s.as_ref().to_string()).collect();
        Ok(())
    }

    /// Enable or disable a step, setting its status to `Pending` or
    /// `Disabled` immediately.
    ///
    /// Returns `false` if no such step is registered.
    pub fn enable_step(&self, id: &str, enabled: bool) -> bool {
        match lock(&self.registry).steps.get_mut(id) {
            Some(step) => {
                step.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Snapshot of a registered step.
    pub fn get_step(&self, id: &str) -> Option<Step> {
        lock(&self.registry).steps.get(id).cloned()
    }

    /// Snapshots of all steps in run order.
    pub fn steps(&self) -> Vec<Step> {
        let registry = lock(&self.registry);
        registry
            .order
            .iter()
            .filter_map(|id| registry.steps.get(id).cloned())
            .collect()
    }

    /// Registered ids in run order.
    pub fn step_ids(&self) -> Vec<String> {
        lock(&self.registry).order.clone()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        lock(&self.registry).order.len()
    }

    /// Check whether no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Restore every step's initial runtime state and clear the stop flag.
    pub fn reset(&self) {
        for step in lock(&self.registry).steps.values_mut() {
            step.reset();
        }
        *lock(&self.current_step) = None;
        self.stop_requested.store(false, Ordering::Release);
    }

    // --- run state ------------------------------------------------------

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether a stop has been requested and not yet cleared.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Id of the step currently executing.
    pub fn current_step_id(&self) -> Option<String> {
        lock(&self.current_step).clone()
    }

    /// Directory of the most recent run.
    pub fn run_directory(&self) -> Option<PathBuf> {
        lock(&self.run_directory).clone()
    }

    // --- callbacks ------------------------------------------------------

    /// Called with a snapshot of each step as it starts executing.
    pub fn on_step_start(&self, f: impl Fn(&Step) + Send + Sync + 'static) {
        lock(&self.callbacks).on_step_start = Some(Arc::new(f));
    }

    /// Called with a snapshot of each executed step once its result is recorded.
    pub fn on_step_complete(&self, f: impl Fn(&Step) + Send + Sync + 'static) {
        lock(&self.callbacks).on_step_complete = Some(Arc::new(f));
    }

    /// Called with `(executed, total_enabled)` after each executed step.
    pub fn on_progress(&self, f: impl Fn(usize, usize) + Send + Sync + 'static) {
        lock(&self.callbacks).on_progress = Some(Arc::new(f));
    }

    /// Called with each formatted log line and its level.
    pub fn on_log(&self, f: impl Fn(&str, LogLevel) + Send + Sync + 'static) {
        lock(&self.callbacks).on_log = Some(Arc::new(f));
    }

    /// Remove all callbacks.
    pub fn clear_callbacks(&self) {
        *lock(&self.callbacks) = Callbacks::default();
    }

    fn callbacks(&self) -> Callbacks {
        lock(&self.callbacks).clone()
    }

    // --- logging --------------------------------------------------------

    /// Log a line to the queue, the `on_log` callback, and `tracing`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let line = LogLine::now(level, message);
        line.trace(&self.name);
        let formatted = line.formatted();
        self.logs.push(line);
        if let Some(on_log) = self.callbacks().on_log {
            on_log(&formatted, level);
        }
    }

    /// Take every queued log line.
    pub fn drain_logs(&self) -> Vec<LogLine> {
        self.logs.drain()
    }

    /// Request the current run to stop before its next step.
    ///
    /// A step that is already executing runs to completion.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.log(LogLevel::Warning, "Workflow stop requested");
    }

    // --- execution ------------------------------------------------------

    /// Run every registered step in order, blocking until the run ends.
    ///
    /// `context` seeds the run's shared [`RunContext`].
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRunning` if another run is in progress, or `Io` if
    /// the run directory cannot be created. Step failures are never
    /// returned here; they are recorded in the results.
    pub fn run(&self, context: RunContext) -> Result<RunResults> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StepflowError::AlreadyRunning {
                workflow: self.name.clone(),
            });
        }
        let guard = RunGuard { engine: self };
        self.stop_requested.store(false, Ordering::Release);

        let run_dir = layout::create_run_directory(&self.output_dir, Local::now())?;
        *lock(&self.run_directory) = Some(run_dir.clone());

        let mut context = context;
        context.set_run_directory(&run_dir);

        self.log(LogLevel::Info, format!("Starting workflow '{}'", self.name));
        self.log(
            LogLevel::Info,
            format!("Output directory: {}", run_dir.display()),
        );

        let results = self.run_steps(&run_dir, &mut context);

        drop(guard);

        let summary = RunSummary::from_results(&results);
        self.log(
            LogLevel::Info,
            format!(
                "Workflow completed: {}/{} steps successful",
                summary.succeeded, summary.total
            ),
        );

        Ok(results)
    }

    fn run_steps(&self, run_dir: &Path, context: &mut RunContext) -> RunResults {
        let (order, total_enabled) = {
            let registry = lock(&self.registry);
            let enabled = registry
                .order
                .iter()
                .filter(|id| registry.steps.get(*id).is_some_and(|s| s.enabled))
                .count();
            (registry.order.clone(), enabled)
        };
        let callbacks = self.callbacks();

        let mut results = RunResults::new();
        let mut executed = 0;

        for (position, id) in order.iter().enumerate() {
            let index = position + 1;

            if self.stop_requested() {
                self.log(LogLevel::Warning, "Workflow stopped by user");
                break;
            }

            // Removed while the run was in progress.
            let Some(step) = self.get_step(id) else {
                continue;
            };

            if !step.enabled {
                self.update_step(id, |s| s.status = StepStatus::Disabled);
                results.insert(id.clone(), StepResult::disabled());
                continue;
            }

            let failed_dependency = step
                .dependencies
                .iter()
                .find(|dep| !results.get(dep.as_str()).is_some_and(|r| r.success));
            if let Some(dep) = failed_dependency {
                self.log(
                    LogLevel::Warning,
                    format!("Skipping '{}': dependency '{}' failed", step.name, dep),
                );
                let result = StepResult::dependency_skipped();
                self.update_step(id, |s| {
                    s.status = StepStatus::Skipped;
                    s.result = Some(result.clone());
                });
                results.insert(id.clone(), result);
                continue;
            }

            let step_dir = if self.create_step_directories() {
                match layout::create_step_directory(run_dir, index, id) {
                    Ok(dir) => {
                        context.set_step_directory(&dir);
                        Ok(())
                    }
                    Err(e) => Err(anyhow::Error::new(e)
                        .context(format!("failed to create step directory for '{}'", id))),
                }
            } else {
                Ok(())
            };

            *lock(&self.current_step) = Some(id.clone());
            let started_at = Local::now();
            let started = self.update_step(id, |s| {
                s.status = StepStatus::InProgress;
                s.started_at = Some(started_at);
                s.completed_at = None;
                s.result = None;
            });
            if let (Some(on_start), Some(snapshot)) = (&callbacks.on_step_start, &started) {
                on_start(snapshot);
            }
            self.log(LogLevel::Info, format!("Starting step: {}", step.name));

            let mut result = match step_dir {
                Ok(()) => self.execute(&step, context),
                Err(e) => self.capture_error(&step, &e),
            };

            let completed_at = Local::now();
            result.duration = (completed_at - started_at).to_std().unwrap_or(Duration::ZERO);
            let status = if result.success {
                StepStatus::Completed
            } else {
                StepStatus::Error
            };

            if let Some(timeout) = step.timeout {
                if result.duration > timeout {
                    self.log(
                        LogLevel::Warning,
                        format!(
                            "Step '{}' took {:.1}s, exceeding its {:.1}s timeout",
                            step.name,
                            result.duration.as_secs_f64(),
                            timeout.as_secs_f64()
                        ),
                    );
                }
            }

            let completed = self.update_step(id, |s| {
                s.status = status;
                s.completed_at = Some(completed_at);
                s.result = Some(result.clone());
            });
            results.insert(id.clone(), result);

            if let (Some(on_complete), Some(snapshot)) = (&callbacks.on_step_complete, &completed)
            {
                on_complete(snapshot);
            }

            executed += 1;
            if let Some(on_progress) = &callbacks.on_progress {
                on_progress(executed, total_enabled);
            }

            if status == StepStatus::Error && !(step.continue_on_error || self.continue_on_error())
            {
                self.log(LogLevel::Error, "Workflow stopped due to error");
                break;
            }
        }

        results
    }

    /// Invoke a step's action, converting errors and panics into results.
    fn execute(&self, step: &Step, context: &mut RunContext) -> StepResult {
        let action = step.action();
        match panic::catch_unwind(AssertUnwindSafe(|| action.execute(context))) {
            Ok(Ok(result)) => {
                if result.success {
                    self.log(
                        LogLevel::Success,
                        format!("Completed: {} - {}", step.name, result.message),
                    );
                } else {
                    self.log(
                        LogLevel::Error,
                        format!("Failed: {} - {}", step.name, result.message),
                    );
                }
                result
            }
            Ok(Err(e)) => self.capture_error(step, &e),
            Err(payload) => {
                let result = StepResult::from_panic(payload.as_ref());
                self.log(
                    LogLevel::Error,
                    format!("Error in '{}': {}", step.name, result.message),
                );
                result
            }
        }
    }

    fn capture_error(&self, step: &Step, err: &anyhow::Error) -> StepResult {
        let result = StepResult::from_error(err);
        self.log(
            LogLevel::Error,
            format!("Error in '{}': {}", step.name, result.message),
        );
        self.log(LogLevel::Debug, format!("{:?}", err));
        result
    }

    /// Apply `f` to a registered step and return the updated snapshot.
    fn update_step(&self, id: &str, f: impl FnOnce(&mut Step)) -> Option<Step> {
        let mut registry = lock(&self.registry);
        let step = registry.steps.get_mut(id)?;
        f(step);
        Some(step.clone())
    }

    /// Run on a background thread, passing the results to `callback` on
    /// that thread.
    ///
    /// Returns immediately. If the run cannot start (for example because
    /// another run is in progress) the callback is not invoked and the
    /// error is returned through the join handle.
    pub fn run_async<F>(
        self: &Arc<Self>,
        context: RunContext,
        callback: F,
    ) -> JoinHandle<Result<()>>
    where
        F: FnOnce(RunResults) + Send + 'static,
    {
        let engine = Arc::clone(self);
        thread::spawn(move || {
            let results = engine.run(context)?;
            callback(results);
            Ok(())
        })
    }

    /// Run on a background thread, returning the results through the
    /// join handle.
    pub fn run_in_background(
        self: &Arc<Self>,
        context: RunContext,
    ) -> JoinHandle<Result<RunResults>> {
        let engine = Arc::clone(self);
        thread::spawn(move || engine.run(context))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("output_dir", &self.output_dir)
            .field("steps", &self.step_ids())
            .field("continue_on_error", &self.continue_on_error())
            .field("create_step_directories", &self.create_step_directories())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn ok(message: &'static str) -> impl Fn(&mut RunContext) -> anyhow::Result<StepResult> {
        move |_| Ok(StepResult::success(message))
    }

    fn fail(message: &'static str) -> impl Fn(&mut RunContext) -> anyhow::Result<StepResult> {
        move |_| Ok(StepResult::failure(message))
    }

    fn engine(temp: &TempDir) -> Engine {
        Engine::new("test", temp.path())
    }

    #[test]
    fn add_step_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", ok("a"))).unwrap();

        let err = engine.add_step(Step::from_fn("a", ok("again"))).unwrap_err();
        assert!(matches!(err, StepflowError::DuplicateStep { ref id } if id == "a"));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn remove_step_is_noop_when_absent() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", ok("a"))).unwrap();

        assert!(engine.remove_step("missing").is_none());
        assert!(engine.remove_step("a").is_some());
        assert!(engine.is_empty());
        assert!(engine.step_ids().is_empty());
    }

    #[test]
    fn reorder_requires_permutation() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        for id in ["a", "b", "c"] {
            engine.add_step(Step::from_fn(id, ok("x"))).unwrap();
        }

        assert!(matches!(
            engine.reorder_steps(&["a", "b"]),
            Err(StepflowError::InvalidOrder { .. })
        ));
        assert!(matches!(
            engine.reorder_steps(&["a", "b", "d"]),
            Err(StepflowError::InvalidOrder { .. })
        ));
        assert!(matches!(
            engine.reorder_steps(&["a", "a", "b"]),
            Err(StepflowError::InvalidOrder { .. })
        ));
        assert_eq!(engine.step_ids(), vec!["a", "b", "c"]);

        engine.reorder_steps(&["c", "a", "b"]).unwrap();
        assert_eq!(engine.step_ids(), vec!["c", "a", "b"]);
    }

    #[test]
    fn enable_step_updates_status_outside_run() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", ok("a"))).unwrap();

        assert!(engine.enable_step("a", false));
        assert_eq!(engine.get_step("a").unwrap().status, StepStatus::Disabled);
        assert!(engine.enable_step("a", true));
        assert_eq!(engine.get_step("a").unwrap().status, StepStatus::Pending);
        assert!(!engine.enable_step("missing", true));
    }

    #[test]
    fn run_records_results_in_order() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", ok("first"))).unwrap();
        engine.add_step(Step::from_fn("b", ok("second"))).unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(results.values().all(|r| r.success));
        let a = engine.get_step("a").unwrap();
        assert_eq!(a.status, StepStatus::Completed);
        assert!(a.started_at.is_some());
        assert!(a.completed_at.is_some());
        assert_eq!(a.result.as_ref().unwrap().message, "first");
        assert!(!engine.is_running());
        assert!(engine.current_step_id().is_none());
    }

    #[test]
    fn run_creates_run_and_step_directories() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::from_fn("write", |ctx: &mut RunContext| {
                let dir = ctx.step_directory().expect("step directory");
                std::fs::write(dir.join("out.txt"), "hello")?;
                Ok(StepResult::success("wrote"))
            }))
            .unwrap();

        engine.run(RunContext::new()).unwrap();

        let run_dir = engine.run_directory().unwrap();
        assert_eq!(run_dir.parent().unwrap(), temp.path());
        assert!(run_dir.join("01_write").join("out.txt").exists());
    }

    #[test]
    fn step_directories_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp).with_step_directories(false);
        engine
            .add_step(Step::from_fn("look", |ctx: &mut RunContext| {
                assert!(ctx.run_directory().is_some());
                assert!(ctx.step_directory().is_none());
                Ok(StepResult::success("looked"))
            }))
            .unwrap();

        let results = engine.run(RunContext::new()).unwrap();
        assert!(results["look"].success);
        assert!(!engine.run_directory().unwrap().join("01_look").exists());
    }

    #[test]
    fn step_directory_index_counts_gated_steps() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::builder("off", ok("off")).enabled(false).build())
            .unwrap();
        engine.add_step(Step::from_fn("on", ok("on"))).unwrap();

        engine.run(RunContext::new()).unwrap();

        let run_dir = engine.run_directory().unwrap();
        assert!(!run_dir.join("01_off").exists());
        assert!(run_dir.join("02_on").is_dir());
    }

    #[test]
    fn context_is_shared_between_steps() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::from_fn("produce", |ctx: &mut RunContext| {
                ctx.insert("artifact", "report.csv");
                Ok(StepResult::success("produced"))
            }))
            .unwrap();
        engine
            .add_step(Step::from_fn("consume", |ctx: &mut RunContext| {
                let seed = ctx.get_str("seed").unwrap_or_default().to_string();
                let artifact = ctx.get_str("artifact").unwrap_or_default().to_string();
                Ok(StepResult::success("consumed").with_data(json!([seed, artifact])))
            }))
            .unwrap();

        let mut ctx = RunContext::new();
        ctx.insert("seed", "initial");
        let results = engine.run(ctx).unwrap();

        assert_eq!(
            results["consume"].data,
            Some(json!(["initial", "report.csv"]))
        );
    }

    #[test]
    fn erroring_step_is_contained() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::from_fn("boom", |_: &mut RunContext| {
                Err(anyhow::anyhow!("file not found"))
            }))
            .unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        let result = &results["boom"];
        assert!(!result.success);
        assert_eq!(result.message, "Error: file not found");
        assert!(!result.error.as_deref().unwrap_or_default().is_empty());
        assert_eq!(engine.get_step("boom").unwrap().status, StepStatus::Error);
    }

    #[test]
    fn panicking_step_is_contained() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::from_fn("panic", |_: &mut RunContext| -> anyhow::Result<StepResult> {
                panic!("index out of range")
            }))
            .unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert_eq!(results["panic"].message, "Panic: index out of range");
        assert!(!engine.is_running());
    }

    #[test]
    fn failure_stops_run_by_default() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", fail("bad"))).unwrap();
        engine.add_step(Step::from_fn("b", ok("b"))).unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert!(!results["a"].success);
        assert!(!results.contains_key("b"));
        assert_eq!(engine.get_step("b").unwrap().status, StepStatus::Pending);
    }

    #[test]
    fn step_continue_on_error_keeps_going() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::builder("a", fail("bad")).continue_on_error(true).build())
            .unwrap();
        engine.add_step(Step::from_fn("b", ok("b"))).unwrap();

        let results = engine.run(RunContext::new()).unwrap();
        assert!(results["b"].success);
    }

    #[test]
    fn workflow_continue_on_error_keeps_going() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp).with_continue_on_error(true);
        engine.add_step(Step::from_fn("a", fail("bad"))).unwrap();
        engine.add_step(Step::from_fn("b", ok("b"))).unwrap();

        let results = engine.run(RunContext::new()).unwrap();
        assert!(results["b"].success);
    }

    #[test]
    fn failed_dependency_skips_step() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp).with_continue_on_error(true);
        engine.add_step(Step::from_fn("a", fail("bad"))).unwrap();
        engine.add_step(Step::from_fn("c", ok("c"))).unwrap();
        engine
            .add_step(
                Step::builder("b", |_: &mut RunContext| -> anyhow::Result<StepResult> {
                    panic!("must not run")
                })
                .dependencies(["c", "a"])
                .build(),
            )
            .unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert_eq!(results["b"].message, "Skipped due to failed dependency");
        let b = engine.get_step("b").unwrap();
        assert_eq!(b.status, StepStatus::Skipped);
        assert!(b.result.is_some());
    }

    #[test]
    fn dependency_on_later_step_is_skipped() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::builder("first", ok("first")).depends_on("second").build())
            .unwrap();
        engine.add_step(Step::from_fn("second", ok("second"))).unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert!(!results["first"].success);
        assert!(results["second"].success);
    }

    #[test]
    fn already_running_is_rejected() {
        let temp = TempDir::new().unwrap();
        let engine = Arc::new(engine(&temp));
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        engine
            .add_step(Step::from_fn("wait", move |_: &mut RunContext| {
                entered_tx.send(()).ok();
                lock(&release_rx).recv().ok();
                Ok(StepResult::success("released"))
            }))
            .unwrap();

        let handle = engine.run_in_background(RunContext::new());
        entered_rx.recv().unwrap();

        assert!(engine.is_running());
        assert_eq!(engine.current_step_id().as_deref(), Some("wait"));
        assert!(matches!(
            engine.run(RunContext::new()),
            Err(StepflowError::AlreadyRunning { .. })
        ));

        release_tx.send(()).unwrap();
        let results = handle.join().unwrap().unwrap();
        assert!(results["wait"].success);
        assert!(!engine.is_running());
    }

    #[test]
    fn stop_takes_effect_before_next_step() {
        let temp = TempDir::new().unwrap();
        let engine = Arc::new(engine(&temp));
        let stopper = Arc::clone(&engine);
        engine
            .add_step(Step::from_fn("a", move |_: &mut RunContext| {
                stopper.stop();
                Ok(StepResult::success("finished anyway"))
            }))
            .unwrap();
        engine.add_step(Step::from_fn("b", ok("b"))).unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert!(results["a"].success);
        assert!(!results.contains_key("b"));
        let messages: Vec<_> = engine.drain_logs().into_iter().map(|l| l.message).collect();
        assert!(messages.contains(&"Workflow stop requested".to_string()));
        assert!(messages.contains(&"Workflow stopped by user".to_string()));
    }

    #[test]
    fn run_clears_previous_stop_request() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", ok("a"))).unwrap();

        engine.stop();
        let results = engine.run(RunContext::new()).unwrap();
        assert!(results.contains_key("a"));
    }

    #[test]
    fn reset_restores_initial_state() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.add_step(Step::from_fn("a", ok("a"))).unwrap();
        engine
            .add_step(Step::builder("b", ok("b")).enabled(false).build())
            .unwrap();
        engine.run(RunContext::new()).unwrap();
        engine.stop();

        engine.reset();

        let a = engine.get_step("a").unwrap();
        assert_eq!(a.status, StepStatus::Pending);
        assert!(a.result.is_none());
        assert!(a.started_at.is_none());
        assert_eq!(engine.get_step("b").unwrap().status, StepStatus::Disabled);
        assert!(!engine.stop_requested());
    }

    #[test]
    fn timeout_overrun_is_logged_not_enforced() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(
                Step::builder("slow", |_: &mut RunContext| -> anyhow::Result<StepResult> {
                    thread::sleep(Duration::from_millis(30));
                    Ok(StepResult::success("slow but done"))
                })
                .timeout(Duration::from_millis(1))
                .build(),
            )
            .unwrap();

        let results = engine.run(RunContext::new()).unwrap();

        assert!(results["slow"].success);
        let lines = engine.drain_logs();
        assert!(lines
            .iter()
            .any(|l| l.level == LogLevel::Warning && l.message.contains("exceeding")));
    }

    #[test]
    fn log_lines_reach_callback_and_queue() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.on_log(move |line, level| lock(&sink).push((line.to_string(), level)));
        engine.add_step(Step::from_fn("a", ok("done"))).unwrap();

        engine.run(RunContext::new()).unwrap();

        let seen = lock(&seen);
        assert!(seen
            .iter()
            .any(|(line, level)| *level == LogLevel::Success
                && line.ends_with("[SUCCESS] Completed: a - done")));
        assert!(seen
            .last()
            .unwrap()
            .0
            .ends_with("Workflow completed: 1/1 steps successful"));
        assert_eq!(engine.drain_logs().len(), seen.len());
    }

    #[test]
    fn duration_is_filled_in() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine
            .add_step(Step::from_fn("nap", |_: &mut RunContext| {
                thread::sleep(Duration::from_millis(20));
                Ok(StepResult::success("rested"))
            }))
            .unwrap();

        let results = engine.run(RunContext::new()).unwrap();
        assert!(results["nap"].duration >= Duration::from_millis(15));
    }
}
