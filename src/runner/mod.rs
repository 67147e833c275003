//! Step execution orchestration.
//!
//! - [`Engine`] - Registry of steps and the sequential run loop
//! - [`RunContext`] - Key/value store shared by the steps of one run
//! - [`layout`] - Run and step directory naming
//! - [`log`] - Engine log lines and the hand-off queue

pub mod context;
pub mod engine;
pub mod layout;
pub mod log;

pub use context::{RunContext, RUN_DIRECTORY_KEY, STEP_DIRECTORY_KEY};
pub use engine::{Engine, RunResults};
pub use log::{LogLevel, LogLine, LogQueue};
