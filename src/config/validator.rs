//! Workflow file validation rules.
//!
//! Checks run before an engine is built from a file:
//! - Step ids must be non-empty and unique
//! - Every step needs a command
//! - `depends_on` must reference other existing steps
//! - Dependencies on later steps are flagged, since they can never succeed
//!   first and the dependent step will always be skipped
//! - Timeouts must be finite and fit in a `Duration`

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use crate::config::schema::WorkflowConfig;

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The workflow cannot be built.
    Error,
    /// The workflow runs, but probably not as intended.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A validation finding with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Rule identifier
    pub rule: &'static str,
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Step id if the issue is step-specific
    pub step: Option<String>,
}

impl ValidationIssue {
    fn error(rule: &'static str, step: &str, message: String) -> Self {
        Self {
            rule,
            severity: Severity::Error,
            message,
            step: Some(step.to_string()),
        }
    }

    fn warning(rule: &'static str, step: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule, step, message)
        }
    }

    /// Whether this issue blocks building the workflow.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.rule, self.message)
    }
}

/// Validate a workflow and return every issue found.
pub fn validate(config: &WorkflowConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let positions: HashMap<&str, usize> = config
        .steps
        .iter()
        .enumerate()
        .rev()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let mut seen = HashSet::new();

    for (position, step) in config.steps.iter().enumerate() {
        let id = step.id.as_str();

        if id.trim().is_empty() {
            issues.push(ValidationIssue {
                rule: "missing-id",
                severity: Severity::Error,
                message: format!("Step #{} has no id", position + 1),
                step: None,
            });
        } else if !seen.insert(id) {
            issues.push(ValidationIssue::error(
                "duplicate-id",
                id,
                format!("Step id '{}' is used more than once", id),
            ));
        }

        if step.command.trim().is_empty() {
            issues.push(ValidationIssue::error(
                "missing-command",
                id,
                format!("Step '{}' has no command", id),
            ));
        }

        for dep in &step.depends_on {
            if dep == id {
                issues.push(ValidationIssue::error(
                    "self-dependency",
                    id,
                    format!("Step '{}' depends on itself", id),
                ));
                continue;
            }
            match positions.get(dep.as_str()) {
                None => issues.push(ValidationIssue::error(
                    "unknown-dependency",
                    id,
                    format!("Step '{}' depends on '{}' which does not exist", id, dep),
                )),
                Some(&dep_position) if dep_position > position => {
                    issues.push(ValidationIssue::warning(
                        "forward-dependency",
                        id,
                        format!(
                            "Step '{}' depends on '{}' which runs later; it will always be skipped",
                            id, dep
                        ),
                    ))
                }
                Some(_) => {}
            }
        }

        match step.timeout {
            Some(t) if !t.is_finite() || (t > 0.0 && Duration::try_from_secs_f64(t).is_err()) => {
                issues.push(ValidationIssue::error(
                    "invalid-timeout",
                    id,
                    format!("Step '{}' has an out-of-range timeout: {}", id, t),
                ))
            }
            Some(t) if t <= 0.0 => issues.push(ValidationIssue::warning(
                "non-positive-timeout",
                id,
                format!("Step '{}' has a timeout of zero or less", id),
            )),
            _ => {}
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> WorkflowConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn rules(config: &WorkflowConfig) -> Vec<&'static str> {
        validate(config).into_iter().map(|i| i.rule).collect()
    }

    #[test]
    fn valid_workflow_has_no_issues() {
        let config = parse(
            r#"
            steps:
              - id: fetch
                command: echo fetch
              - id: parse
                command: echo parse
                depends_on: [fetch]
            "#,
        );
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn duplicate_ids_are_errors() {
        let config = parse(
            r#"
            steps:
              - id: fetch
                command: echo a
              - id: fetch
                command: echo b
            "#,
        );
        let issues = validate(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "duplicate-id");
        assert!(issues[0].is_error());
    }

    #[test]
    fn missing_id_and_command_are_errors() {
        let config = parse(
            r#"
            steps:
              - command: echo anonymous
              - id: empty
            "#,
        );
        assert_eq!(rules(&config), vec!["missing-id", "missing-command"]);
    }

    #[test]
    fn unknown_and_self_dependencies_are_errors() {
        let config = parse(
            r#"
            steps:
              - id: a
                command: echo a
                depends_on: [a, ghost]
            "#,
        );
        assert_eq!(rules(&config), vec!["self-dependency", "unknown-dependency"]);
    }

    #[test]
    fn forward_dependency_is_warning() {
        let config = parse(
            r#"
            steps:
              - id: report
                command: echo report
                depends_on: [parse]
              - id: parse
                command: echo parse
            "#,
        );
        let issues = validate(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "forward-dependency");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].step.as_deref(), Some("report"));
    }

    #[test]
    fn zero_timeout_is_warning() {
        let config = parse(
            r#"
            steps:
              - id: a
                command: echo a
                timeout: 0
            "#,
        );
        let issues = validate(&config);
        assert_eq!(issues[0].rule, "non-positive-timeout");
        assert!(!issues[0].is_error());
    }

    #[test]
    fn non_finite_and_huge_timeouts_are_errors() {
        let config = parse(
            r#"
            steps:
              - id: a
                command: echo a
                timeout: .inf
              - id: b
                command: echo b
                timeout: 1e300
              - id: c
                command: echo c
                timeout: .nan
            "#,
        );
        let issues = validate(&config);
        assert_eq!(issues.len(), 3);
        assert!(issues
            .iter()
            .all(|i| i.rule == "invalid-timeout" && i.is_error()));
    }

    #[test]
    fn issue_display_includes_severity_and_rule() {
        let issue = ValidationIssue::error(
            "duplicate-id",
            "a",
            "Step id 'a' is used more than once".into(),
        );
        assert_eq!(
            issue.to_string(),
            "error [duplicate-id]: Step id 'a' is used more than once"
        );
    }
}
