//! Step definitions and outcomes.
//!
//! - [`Step`] - A named unit of work plus its runtime state
//! - [`StepAction`] - The work itself; closures implement it
//! - [`StepStatus`] - Track step execution state
//! - [`StepResult`] - Capture execution results
//! - [`CommandAction`] - A step body that runs a shell command
//!
//! # Example
//!
//! ```
//! use stepflow::runner::RunContext;
//! use stepflow::steps::{Step, StepResult, StepStatus};
//!
//! let step = Step::builder("parse", |ctx: &mut RunContext| -> anyhow::Result<StepResult> {
//!     ctx.insert("parsed", 4);
//!     Ok(StepResult::success("parsed 4 files"))
//! })
//! .name("Parse sources")
//! .depends_on("fetch")
//! .build();
//!
//! assert_eq!(step.status, StepStatus::Pending);
//! assert_eq!(step.dependencies, vec!["fetch"]);
//! ```

pub mod command;
pub mod result;
pub mod status;
pub mod step;

pub use command::CommandAction;
pub use result::{
    format_duration, RunSummary, StepResult, DEPENDENCY_SKIPPED_MESSAGE, DISABLED_MESSAGE,
};
pub use status::StepStatus;
pub use step::{Step, StepAction, StepBuilder};
