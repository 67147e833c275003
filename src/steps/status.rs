//! Step status tracking.

use serde::Serialize;

/// Status of a step within the current run.
///
/// Enabled steps start out `Pending`, disabled ones `Disabled`. A run moves
/// an eligible step through `InProgress` into `Completed` or `Error`; a step
/// whose dependency did not succeed goes straight to `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step is waiting to run.
    Pending,

    /// Step is currently executing.
    InProgress,

    /// Step completed successfully.
    Completed,

    /// Step was gated out by a failed or missing dependency.
    Skipped,

    /// Step failed, either by returning an unsuccessful result or by erroring.
    Error,

    /// Step is disabled and will not run.
    Disabled,
}

impl StepStatus {
    /// Initial status for a step with the given enabled flag.
    pub fn initial(enabled: bool) -> Self {
        if enabled {
            StepStatus::Pending
        } else {
            StepStatus::Disabled
        }
    }

    /// Check if this is a terminal state for the current run.
    ///
    /// Everything except `InProgress` is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepStatus::InProgress)
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Pending => '○',
            StepStatus::InProgress => '◉',
            StepStatus::Completed => '✓',
            StepStatus::Skipped => '⊘',
            StepStatus::Error => '✗',
            StepStatus::Disabled => '-',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in progress",
            StepStatus::Completed => "completed",
            StepStatus::Skipped => "skipped",
            StepStatus::Error => "error",
            StepStatus::Disabled => "disabled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_status_follows_enabled_flag() {
        assert_eq!(StepStatus::initial(true), StepStatus::Pending);
        assert_eq!(StepStatus::initial(false), StepStatus::Disabled);
    }

    #[test]
    fn only_in_progress_is_not_terminal() {
        assert!(!StepStatus::InProgress.is_terminal());
        for status in [
            StepStatus::Pending,
            StepStatus::Completed,
            StepStatus::Skipped,
            StepStatus::Error,
            StepStatus::Disabled,
        ] {
            assert!(status.is_terminal(), "{} should be terminal", status);
        }
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(StepStatus::InProgress.to_string(), "in progress");
        assert_eq!(StepStatus::Error.to_string(), "error");
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&StepStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
