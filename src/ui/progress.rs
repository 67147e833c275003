//! Run progress display.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar fed by the engine's progress callback.
///
/// Clones share the same bar, so a clone can be moved into engine
/// callbacks running on the engine thread.
#[derive(Debug, Clone)]
pub struct RunProgressBar {
    bar: ProgressBar,
}

impl RunProgressBar {
    /// Create a visible bar for `total` enabled steps.
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.magenta} [{bar:30.magenta/dim}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }

    /// Create a bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Show the step currently executing.
    pub fn set_step(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    /// Record `done` of `total` executed steps.
    pub fn set_progress(&self, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
    }

    /// Print a line above the bar. Hidden bars print nothing.
    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    /// Whether the bar draws nothing.
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Current position.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Current length.
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}
