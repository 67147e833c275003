//! Shell command step bodies.

use std::collections::HashMap;
use std::process::{Command, Stdio};

use anyhow::Context;
use serde_json::json;

use crate::runner::RunContext;

use super::result::StepResult;
use super::step::StepAction;

/// Environment variable carrying the run directory.
pub const RUN_DIR_ENV: &str = "STEPFLOW_RUN_DIR";

/// Environment variable carrying the step directory.
pub const STEP_DIR_ENV: &str = "STEPFLOW_STEP_DIR";

/// Runs a shell command as a step.
///
/// The command runs in the step directory when there is one, otherwise in
/// the run directory. Exit status 0 is success. Captured output is returned
/// as the result's data, and stdout is also stored in the context under
/// `<step id>.stdout` for later steps.
#[derive(Debug, Clone)]
pub struct CommandAction {
    step_id: String,
    command: String,
    env: HashMap<String, String>,
}

impl CommandAction {
    /// Create a command action for the step with the given id.
    pub fn new(step_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            command: command.into(),
            env: HashMap::new(),
        }
    }

    /// Add environment variables for the command.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// The command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Context key under which stdout is stored.
    pub fn stdout_key(&self) -> String {
        format!("{}.stdout", self.step_id)
    }
}

impl StepAction for CommandAction {
    fn execute(&self, context: &mut RunContext) -> anyhow::Result<StepResult> {
        let (shell, flag) = shell();
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(&self.command);

        let run_dir = context.run_directory();
        let step_dir = context.step_directory();
        if let Some(dir) = step_dir.as_ref().or(run_dir.as_ref()) {
            cmd.current_dir(dir);
        }

        cmd.envs(&self.env);
        if let Some(dir) = &run_dir {
            cmd.env(RUN_DIR_ENV, dir);
        }
        if let Some(dir) = &step_dir {
            cmd.env(STEP_DIR_ENV, dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(step = %self.step_id, "Running command: {}", self.command);
        let output = cmd
            .output()
            .with_context(|| format!("failed to run `{}`", self.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        context.insert(self.stdout_key(), stdout.trim_end());

        let data = json!({
            "exit_code": exit_code,
            "stdout": stdout,
            "stderr": stderr,
        });

        let result = if output.status.success() {
            StepResult::success("completed")
        } else {
            match exit_code {
                Some(code) => StepResult::failure(format!("exit code {}", code)),
                None => StepResult::failure("terminated by signal"),
            }
        };

        Ok(result.with_data(data))
    }
}

fn shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn successful_command_captures_stdout() {
        let action = CommandAction::new("hello", "echo hello");
        let mut ctx = RunContext::new();

        let result = action.execute(&mut ctx).unwrap();

        assert!(result.success);
        assert_eq!(result.message, "completed");
        let data = result.data.unwrap();
        assert_eq!(data["exit_code"], 0);
        assert_eq!(data["stdout"], "hello\n");
        assert_eq!(ctx.get_str("hello.stdout"), Some("hello"));
    }

    #[test]
    fn failing_command_reports_exit_code() {
        let action = CommandAction::new("bad", "echo oops >&2; exit 3");
        let mut ctx = RunContext::new();

        let result = action.execute(&mut ctx).unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "exit code 3");
        assert_eq!(result.data.unwrap()["stderr"], "oops\n");
    }

    #[test]
    fn runs_in_step_directory_with_env() {
        let temp = TempDir::new().unwrap();
        let mut ctx = RunContext::new();
        ctx.set_run_directory(temp.path());
        let step_dir = temp.path().join("01_write");
        std::fs::create_dir_all(&step_dir).unwrap();
        ctx.set_step_directory(&step_dir);

        let mut env = HashMap::new();
        env.insert("GREETING".to_string(), "hi".to_string());
        let action = CommandAction::new(
            "write",
            "echo \"$GREETING\" > out.txt; echo \"$STEPFLOW_RUN_DIR\"",
        )
        .with_env(env);

        let result = action.execute(&mut ctx).unwrap();

        assert!(result.success);
        assert_eq!(
            std::fs::read_to_string(step_dir.join("out.txt")).unwrap(),
            "hi\n"
        );
        assert_eq!(
            ctx.get_str("write.stdout"),
            Some(temp.path().to_string_lossy().as_ref())
        );
    }

    #[test]
    fn falls_back_to_run_directory() {
        let temp = TempDir::new().unwrap();
        let mut ctx = RunContext::new();
        ctx.set_run_directory(temp.path());

        let action = CommandAction::new("touch", "touch marker");
        assert!(action.execute(&mut ctx).unwrap().success);
        assert!(temp.path().join("marker").exists());
    }
}
