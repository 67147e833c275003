//! Visual theme and styling.

use console::Style;

use crate::runner::LogLevel;
use crate::steps::StepStatus;

/// Stepflow's visual theme.
#[derive(Debug, Clone)]
pub struct StepflowTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for informational elements (magenta).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (magenta bold).
    pub header: Style,
    /// Style for key labels in key-value displays (bold).
    pub key: Style,
}

impl Default for StepflowTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl StepflowTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            key: Style::new(),
        }
    }

    /// Pick the colored or plain theme for the current terminal.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("▶"), self.highlight.apply_to(title))
    }

    /// Style a formatted engine log line by its level.
    pub fn format_log_line(&self, line: &str, level: LogLevel) -> String {
        let style = match level {
            LogLevel::Debug => &self.dim,
            LogLevel::Info => return line.to_string(),
            LogLevel::Success => &self.success,
            LogLevel::Warning => &self.warning,
            LogLevel::Error | LogLevel::Critical => &self.error,
        };
        format!("{}", style.apply_to(line))
    }

    /// Format text prefixed with a step status marker.
    pub fn format_status(&self, status: StepStatus, text: &str) -> String {
        let marked = format!("{} {}", status.display_char(), text);
        let style = match status {
            StepStatus::Completed => &self.success,
            StepStatus::Error => &self.error,
            StepStatus::Skipped => &self.warning,
            StepStatus::InProgress => &self.info,
            StepStatus::Pending | StepStatus::Disabled => &self.dim,
        };
        format!("{}", style.apply_to(marked))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
