//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for capturing output in tests
//! - A progress bar driven by engine callbacks
//!
//! # Example
//!
//! ```
//! use stepflow::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(OutputMode::Silent, false);
//! ui.show_header("nightly");
//! ui.success("Workflow completed");
//! ```

pub mod mock;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use progress::RunProgressBar;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, StepflowTheme};

use crate::runner::LogLine;

/// Abstraction over terminal output so commands can be tested.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Show a plain message.
    fn message(&mut self, msg: &str);

    /// Show a success message.
    fn success(&mut self, msg: &str);

    /// Show a warning message.
    fn warning(&mut self, msg: &str);

    /// Show an error message. Shown in every output mode.
    fn error(&mut self, msg: &str);

    /// Show a section header.
    fn show_header(&mut self, title: &str);

    /// Show a line from the engine log.
    fn log_line(&mut self, line: &LogLine);

    /// Write machine-readable output. Shown in every output mode.
    fn output(&mut self, text: &str);

    /// Create the progress bar for a run over `total` steps.
    fn start_progress(&mut self, total: usize) -> RunProgressBar;

    /// Stop drawing the current progress bar.
    fn finish_progress(&mut self);

    /// Check if running interactively.
    fn is_interactive(&self) -> bool;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);
}
