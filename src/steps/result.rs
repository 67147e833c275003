//! Step outcome records.

use std::any::Any;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;

/// Message recorded for a disabled step.
pub const DISABLED_MESSAGE: &str = "Step disabled";

/// Message recorded for a step gated out by its dependencies.
pub const DEPENDENCY_SKIPPED_MESSAGE: &str = "Skipped due to failed dependency";

/// Outcome of a single step invocation.
///
/// Step bodies build these with [`StepResult::success`] or
/// [`StepResult::failure`]; the engine fills in `duration` once the step
/// has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the step succeeded.
    pub success: bool,

    /// Human-readable outcome.
    pub message: String,

    /// Payload for downstream steps and consumers.
    pub data: Option<Value>,

    /// Captured error detail, set when the step body errored or panicked.
    pub error: Option<String>,

    /// Execution duration, zero until the engine sets it.
    pub duration: Duration,
}

impl StepResult {
    /// Create a successful result.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create an unsuccessful result reported by the step itself.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message)
        }
    }

    /// Attach a data payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Result recorded for a disabled step.
    pub fn disabled() -> Self {
        Self::success(DISABLED_MESSAGE)
    }

    /// Result recorded for a step whose dependency did not succeed.
    pub fn dependency_skipped() -> Self {
        Self::failure(DEPENDENCY_SKIPPED_MESSAGE)
    }

    /// Convert an error returned by a step body into a failed result.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            error: Some(format!("{:?}", err)),
            ..Self::failure(format!("Error: {}", err))
        }
    }

    /// Convert a panic payload caught from a step body into a failed result.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Self {
            error: Some(detail.clone()),
            ..Self::failure(format!("Panic: {}", detail))
        }
    }

    /// Duration in fractional seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self, id: &str) -> String {
        if self.success {
            format!(
                "✓ {} - {} ({})",
                id,
                self.message,
                format_duration(self.duration)
            )
        } else {
            format!("✗ {} - {}", id, self.message)
        }
    }
}

/// Success tally over the results of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Number of recorded results.
    pub total: usize,

    /// Results with `success == true`.
    pub succeeded: usize,
}

impl RunSummary {
    /// Count successes in a results map.
    pub fn from_results(results: &IndexMap<String, StepResult>) -> Self {
        Self {
            total: results.len(),
            succeeded: results.values().filter(|r| r.success).count(),
        }
    }

    /// Number of recorded results that did not succeed.
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Whether every recorded result succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
