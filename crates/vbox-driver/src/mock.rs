//! Scripted runner for tests.
//!
//! Replies are keyed on the full invocation (`command` followed by its
//! arguments, space separated). Invocations with no scripted reply succeed
//! with empty output, which matches what VBoxManage prints for most
//! mutating commands.

use crate::error::{Result, VmError};
use crate::runner::{render_command, CommandRunner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Failure { exit_code: i32, stderr: String },
}

/// In-memory [`CommandRunner`] that replays canned output and records calls.
#[derive(Debug)]
pub struct MockRunner {
    program: PathBuf,
    replies: HashMap<String, Reply>,
    tool_missing: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a runner with no scripted replies.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("VBoxManage"),
            replies: HashMap::new(),
            tool_missing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply to `invocation` with `stdout` and a zero exit code.
    pub fn on(mut self, invocation: &[&str], stdout: impl Into<String>) -> Self {
        self.replies
            .insert(invocation.join(" "), Reply::Stdout(stdout.into()));
        self
    }

    /// Make `invocation` exit with `exit_code` and `stderr`.
    pub fn on_failure(mut self, invocation: &[&str], exit_code: i32, stderr: &str) -> Self {
        self.replies.insert(
            invocation.join(" "),
            Reply::Failure {
                exit_code,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Behave as if the executable is not installed.
    pub fn tool_missing(mut self) -> Self {
        self.tool_missing = true;
        self
    }

    /// Every invocation so far, each as `[command, args...]`.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invocations of one subcommand.
    pub fn calls_to(&self, command: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.first().map(String::as_str) == Some(command))
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let mut call = Vec::with_capacity(args.len() + 1);
        call.push(command.to_string());
        call.extend(args.iter().map(|a| a.to_string()));
        let key = call.join(" ");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if self.tool_missing {
            return Err(VmError::ToolNotFound {
                program: self.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }

        match self.replies.get(&key) {
            Some(Reply::Stdout(out)) => Ok(out.clone()),
            Some(Reply::Failure { exit_code, stderr }) => Err(VmError::CommandFailed {
                command: render_command(&self.program, command, args),
                exit_code: *exit_code,
                stderr: stderr.clone(),
            }),
            None => Ok(String::new()),
        }
    }

    fn program(&self) -> &Path {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reply_and_recording() {
        let runner = MockRunner::new().on(&["list", "vms"], "\"a\" {1}\n");
        assert_eq!(runner.execute("list", &["vms"]).unwrap(), "\"a\" {1}\n");
        assert_eq!(runner.execute("startvm", &["1"]).unwrap(), "");
        assert_eq!(runner.calls().len(), 2);
        assert_eq!(runner.calls_to("startvm"), vec![vec!["startvm", "1"]]);
    }

    #[test]
    fn test_scripted_failure() {
        let runner = MockRunner::new().on_failure(&["startvm", "x"], 1, "no such vm");
        let err = runner.execute("startvm", &["x"]).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_tool_missing() {
        let runner = MockRunner::new().tool_missing();
        assert!(matches!(
            runner.execute("--version", &[]),
            Err(VmError::ToolNotFound { .. })
        ));
    }
}
