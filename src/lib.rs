//! Stepflow - ordered workflow execution.
//!
//! A workflow is an ordered list of named steps. The [`Engine`] runs them
//! in registration order, passing a shared [`RunContext`] from step to
//! step, creating a timestamped run directory with one sub-directory per
//! executed step, and recording a [`StepResult`] for every step it visits.
//! Steps can be disabled, can depend on earlier steps, and can let the run
//! continue after they fail.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Workflow file loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - The engine, run context, directories, and log queue
//! - [`steps`] - Steps, step bodies, statuses, and results
//! - [`ui`] - Terminal output, themes, and progress
//!
//! # Example
//!
//! ```
//! use stepflow::{Engine, RunContext, Step, StepResult};
//!
//! let temp = tempfile::tempdir().unwrap();
//! let engine = Engine::new("example", temp.path());
//!
//! engine
//!     .add_step(Step::from_fn("count", |ctx| {
//!         ctx.insert("count", 3);
//!         Ok(StepResult::success("counted"))
//!     }))
//!     .unwrap();
//! engine
//!     .add_step(
//!         Step::builder("report", |ctx: &mut RunContext| -> anyhow::Result<StepResult> {
//!             let count = ctx.get_i64("count").unwrap_or_default();
//!             Ok(StepResult::success(format!("{} items", count)))
//!         })
//!         .depends_on("count")
//!         .build(),
//!     )
//!     .unwrap();
//!
//! let results = engine.run(RunContext::new()).unwrap();
//! assert_eq!(results["report"].message, "3 items");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod steps;
pub mod ui;

pub use error::{Result, StepflowError};
pub use runner::{Engine, LogLevel, LogLine, RunContext, RunResults};
pub use steps::{CommandAction, RunSummary, Step, StepAction, StepResult, StepStatus};
