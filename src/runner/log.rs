//! Engine log lines and the hand-off queue.
//!
//! Every line the engine logs is formatted as `[HH:MM:SS] [LEVEL] message`,
//! appended to a [`LogQueue`], and mirrored to `tracing`. The engine never
//! drains the queue; a consumer (a log pane, the CLI) takes lines with
//! [`LogQueue::drain`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Severity of an engine log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    /// A step finished successfully.
    Success,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Upper-case label used in formatted lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One engine log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// When the line was logged.
    pub timestamp: DateTime<Local>,

    /// Severity.
    pub level: LogLevel,

    /// Unformatted message.
    pub message: String,
}

impl LogLine {
    /// Create a line stamped with the current local time.
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }

    /// Format as `[HH:MM:SS] [LEVEL] message`.
    pub fn formatted(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }

    /// Forward the message to the `tracing` subscriber.
    pub(crate) fn trace(&self, workflow: &str) {
        match self.level {
            LogLevel::Debug => tracing::debug!(workflow = workflow, "{}", self.message),
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(workflow = workflow, "{}", self.message)
            }
            LogLevel::Warning => tracing::warn!(workflow = workflow, "{}", self.message),
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(workflow = workflow, "{}", self.message)
            }
        }
    }
}

/// Unbounded, thread-safe queue of log lines.
#[derive(Debug, Default)]
pub struct LogQueue {
    lines: Mutex<VecDeque<LogLine>>,
}

impl LogQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&self, line: LogLine) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(line);
    }

    /// Take every queued line, oldest first.
    pub fn drain(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect()
    }

    /// Number of queued lines.
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_line_has_time_and_level() {
        let line = LogLine {
            timestamp: Local.with_ymd_and_hms(2024, 1, 2, 7, 8, 9).unwrap(),
            level: LogLevel::Success,
            message: "Completed: Fetch - ok".to_string(),
        };
        assert_eq!(line.formatted(), "[07:08:09] [SUCCESS] Completed: Fetch - ok");
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Success < LogLevel::Warning);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn queue_drains_in_order() {
        let queue = LogQueue::new();
        queue.push(LogLine::now(LogLevel::Info, "first"));
        queue.push(LogLine::now(LogLevel::Warning, "second"));
        assert_eq!(queue.len(), 2);

        let lines = queue.drain();
        assert_eq!(lines[0].message, "first");
        assert_eq!(lines[1].level, LogLevel::Warning);
        assert!(queue.is_empty());
    }
}
